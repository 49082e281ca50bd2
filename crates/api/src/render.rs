//! HTML pages. Every piece of dynamic text goes through [`encode_text`].

use crate::quiz::{Page, Route};
use core::fmt::Write;
use html_escape::encode_text;
use model::{Summary, SummaryEntry};

const STYLESHEET: &str = "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";

const fn verdict(answer: bool) -> &'static str {
    if answer {
        "True"
    } else {
        "False"
    }
}

fn layout(title: &str, notices: &[String], body: &str) -> String {
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<link rel=\"stylesheet\" href=\"{STYLESHEET}\">\n</head>\n<body>\n<main>\n",
        encode_text(title),
    );

    if !notices.is_empty() {
        html.push_str("<ul class=\"notices\">\n");
        for notice in notices {
            let _ = writeln!(html, "<li>{}</li>", encode_text(notice));
        }
        html.push_str("</ul>\n");
    }

    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn unavailable() -> String {
    format!(
        "<h1>Trivia Quiz</h1>\n<p>The quiz could not be started right now.</p>\n\
         <p><a href=\"{}\">Try again</a></p>\n",
        Route::Index.path(),
    )
}

fn question(text: &str, number: usize, total: usize) -> String {
    format!(
        "<h1>Question {number} of {total}</h1>\n<p class=\"question\">{}</p>\n\
         <form method=\"post\" action=\"/vote/up\"><button type=\"submit\" aria-label=\"Agree\">\
         <i class=\"fa-solid fa-thumbs-up\"></i> True</button></form>\n\
         <form method=\"post\" action=\"/vote/down\"><button type=\"submit\" aria-label=\"Disagree\">\
         <i class=\"fa-solid fa-thumbs-down\"></i> False</button></form>\n",
        encode_text(text),
    )
}

fn summary(Summary { entries, score, total }: &Summary) -> String {
    let mut html = format!("<h1>Results</h1>\n<p class=\"score\">You scored {score} out of {total}.</p>\n<ol>\n");
    for SummaryEntry { question, correct_answer, user_answer, is_correct } in entries {
        let (class, mark) = if *is_correct { ("correct", "fa-check") } else { ("incorrect", "fa-xmark") };
        let _ = writeln!(
            html,
            "<li class=\"{class}\"><i class=\"fa-solid {mark}\"></i> {}<br>Your answer: {}. Correct answer: {}.</li>",
            encode_text(question),
            verdict(*user_answer),
            verdict(*correct_answer),
        );
    }
    html.push_str("</ol>\n<p><a href=\"/play-again\">Play again</a></p>\n");
    html
}

/// Renders a complete document for the page, listing the queued notices above it.
pub fn page(page: &Page, notices: &[String]) -> String {
    match page {
        Page::Unavailable => layout("Trivia Quiz", notices, &unavailable()),
        Page::Question { text, number, total } => layout("Trivia Quiz", notices, &question(text, *number, *total)),
        Page::Summary(result) => layout("Quiz Results", notices, &summary(result)),
    }
}
