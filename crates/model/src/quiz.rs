use alloc::{string::String, vec::Vec};

/// A true/false statement along with its expected verdict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    /// Statement to be displayed to the player. Already free of HTML entities.
    pub text: String,
    /// Whether the statement is true.
    pub answer: bool,
}

impl Question {
    pub fn new(text: impl Into<String>, answer: bool) -> Self {
        Self { text: text.into(), answer }
    }
}

/// Returned by [`QuizSession::record`] when every question already has an answer.
#[derive(Debug, PartialEq, Eq)]
pub struct Completed;

/// Progress of a single player through a fixed list of questions.
///
/// The current index is never stored. It is always the number of recorded answers, which
/// in turn never exceeds the number of questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: Vec<bool>,
}

impl QuizSession {
    /// Begins a new quiz. Returns `None` if there is nothing to ask.
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        let answers = Vec::with_capacity(questions.len());
        Some(Self { questions, answers })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[bool] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.answers.len()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.current_index() >= self.len()
    }

    /// The zero-based index and contents of the question awaiting an answer.
    pub fn current(&self) -> Option<(usize, &Question)> {
        let index = self.current_index();
        self.questions.get(index).map(|question| (index, question))
    }

    /// Appends the answer to the current question. Returns the new current index.
    pub fn record(&mut self, answer: bool) -> Result<usize, Completed> {
        if self.is_complete() {
            return Err(Completed);
        }
        self.answers.push(answer);
        Ok(self.current_index())
    }

    /// Scores the quiz. Only possible once every question has exactly one answer.
    pub fn summarize(&self) -> Option<Summary> {
        if self.answers.is_empty() || self.answers.len() != self.questions.len() {
            return None;
        }

        let entries: Vec<_> = self
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, &user_answer)| SummaryEntry {
                question: question.text.clone(),
                correct_answer: question.answer,
                user_answer,
                is_correct: question.answer == user_answer,
            })
            .collect();
        let score = entries.iter().filter(|entry| entry.is_correct).count();
        Some(Summary { total: entries.len(), score, entries })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryEntry {
    pub question: String,
    pub correct_answer: bool,
    pub user_answer: bool,
    pub is_correct: bool,
}

/// Final tally of a completed quiz.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub entries: Vec<SummaryEntry>,
    /// Number of entries where the player matched the expected verdict.
    pub score: usize,
    pub total: usize,
}
