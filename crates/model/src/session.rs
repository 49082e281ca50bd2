use crate::QuizSession;
use alloc::{string::String, vec::Vec};

/// Most notices kept between two rendered pages. The oldest ones give way first.
pub const MAX_NOTICES: usize = 8;

/// Everything the server remembers about one browser.
#[derive(Debug, Default)]
pub struct Session {
    /// The quiz in progress, if any. Cleared once the results have been shown.
    pub quiz: Option<QuizSession>,
    /// Flash messages waiting for the next rendered page.
    pub notices: Vec<String>,
}

impl Session {
    /// Queues a notice for the next rendered page. A repeat of the latest notice is dropped.
    pub fn notify(&mut self, notice: impl Into<String>) {
        let notice = notice.into();
        if self.notices.last() == Some(&notice) {
            return;
        }
        if self.notices.len() >= MAX_NOTICES {
            self.notices.remove(0);
        }
        self.notices.push(notice);
    }

    /// Drains the pending notices in the order they were queued.
    pub fn take_notices(&mut self) -> Vec<String> {
        core::mem::take(&mut self.notices)
    }
}
