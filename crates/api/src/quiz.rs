//! Quiz progression over a single [`Session`].
//!
//! A session moves from having no quiz, to a quiz in progress, to a completed quiz whose
//! results clear it again. Every operation leaves the session consistent and describes the
//! next step as an [`Outcome`].

use crate::source::{Fetched, QuestionSource, Upstream};
use core::str::FromStr;
use model::{QuizSession, Session, Summary};

pub const UNABLE_TO_START: &str = "Unable to start the quiz. Please try again later.";
pub const NO_ACTIVE_QUIZ: &str = "No active quiz session found. Please start a new quiz.";
pub const INVALID_ACTION: &str = "Invalid action. Please use the provided buttons.";
pub const ALREADY_COMPLETED: &str = "Quiz already completed.";
pub const NO_QUIZ_DATA: &str = "No quiz data found.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Index,
    Quiz,
    Summary,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Index => "/",
            Self::Quiz => "/quiz",
            Self::Summary => "/summary",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Page {
    /// Shown when not even the fallback questions could be used.
    Unavailable,
    Question {
        text: String,
        /// One-based position of the question.
        number: usize,
        total: usize,
    },
    Summary(Summary),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Redirect(Route),
    Render(Page),
}

/// Thumbs up agrees with the statement; thumbs down disagrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidVote;

impl FromStr for Vote {
    type Err = InvalidVote;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(InvalidVote),
        }
    }
}

impl Vote {
    pub const fn answer(self) -> bool {
        matches!(self, Self::Up)
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Up => "You agreed 👍 to the last question.",
            Self::Down => "You disagreed 👎 to the last question.",
        }
    }
}

/// Begins a new quiz unless one is already underway.
pub async fn start<U: Upstream>(session: &mut Session, source: &QuestionSource<U>) -> Outcome {
    if session.quiz.is_none() {
        let Fetched { questions, notices } = source.fetch().await;
        for notice in notices {
            session.notify(notice);
        }
        match QuizSession::new(questions) {
            Some(quiz) => session.quiz = Some(quiz),
            None => {
                session.notify(UNABLE_TO_START);
                return Outcome::Render(Page::Unavailable);
            }
        }
    }
    Outcome::Redirect(Route::Quiz)
}

/// Shows the question awaiting an answer. Never changes the quiz itself.
pub fn view(session: &mut Session) -> Outcome {
    let Some(quiz) = session.quiz.as_ref() else {
        session.notify(NO_ACTIVE_QUIZ);
        return Outcome::Redirect(Route::Index);
    };

    match quiz.current() {
        Some((index, question)) => Outcome::Render(Page::Question {
            text: question.text.clone(),
            number: index + 1,
            total: quiz.len(),
        }),
        None => Outcome::Redirect(Route::Summary),
    }
}

/// Records the player's verdict on the current question and moves on.
pub fn vote(session: &mut Session, action: &str) -> Outcome {
    let Ok(vote) = action.parse::<Vote>() else {
        session.notify(INVALID_ACTION);
        return Outcome::Redirect(Route::Quiz);
    };

    let Some(quiz) = session.quiz.as_mut() else {
        session.notify(NO_ACTIVE_QUIZ);
        return Outcome::Redirect(Route::Index);
    };

    let Ok(next) = quiz.record(vote.answer()) else {
        session.notify(ALREADY_COMPLETED);
        return Outcome::Redirect(Route::Summary);
    };

    let route = if next >= quiz.len() { Route::Summary } else { Route::Quiz };
    session.notify(vote.message());
    Outcome::Redirect(route)
}

/// Scores a completed quiz and forgets it.
pub fn summary(session: &mut Session) -> Outcome {
    let Some(summary) = session.quiz.as_ref().and_then(QuizSession::summarize) else {
        session.notify(NO_QUIZ_DATA);
        return Outcome::Redirect(Route::Index);
    };
    session.quiz = None;
    Outcome::Render(Page::Summary(summary))
}

/// Abandons whatever quiz exists so that the next visit starts over.
pub fn play_again(session: &mut Session) -> Outcome {
    session.quiz = None;
    Outcome::Redirect(Route::Index)
}
