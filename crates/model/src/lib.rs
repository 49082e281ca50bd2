#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod opentdb;
pub mod quiz;
pub mod session;

pub use quiz::{Question, QuizSession, Summary, SummaryEntry};
pub use session::Session;
