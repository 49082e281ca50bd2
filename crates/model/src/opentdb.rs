//! Wire schema of the [Open Trivia Database](https://opentdb.com/api_config.php) API.

use alloc::{string::String, vec::Vec};
use core::fmt::{self, Formatter};
use serde::{
    de::{Error, Unexpected, Visitor},
    Deserialize, Deserializer,
};

/// Status value returned alongside every batch of questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    /// The database does not have enough questions for the query.
    NoResults,
    /// The query contains an invalid argument.
    InvalidParameter,
    /// The session token does not exist.
    TokenNotFound,
    /// The session token has returned all possible questions for the query.
    TokenEmpty,
    /// Too many requests from the same address.
    RateLimit,
    Unknown(u64),
}

impl ResponseCode {
    /// The numeric value as sent over the wire.
    pub const fn code(self) -> u64 {
        match self {
            Self::Success => 0,
            Self::NoResults => 1,
            Self::InvalidParameter => 2,
            Self::TokenNotFound => 3,
            Self::TokenEmpty => 4,
            Self::RateLimit => 5,
            Self::Unknown(other) => other,
        }
    }
}

impl From<u64> for ResponseCode {
    fn from(code: u64) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::NoResults,
            2 => Self::InvalidParameter,
            3 => Self::TokenNotFound,
            4 => Self::TokenEmpty,
            5 => Self::RateLimit,
            other => Self::Unknown(other),
        }
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Self::from)
    }
}

/// A question exactly as the API sends it. The text may contain HTML entities.
#[derive(Debug, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    #[serde(deserialize_with = "verdict")]
    pub correct_answer: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub response_code: ResponseCode,
    #[serde(default)]
    pub results: Vec<RawQuestion>,
}

struct VerdictVisitor;

impl Visitor<'_> for VerdictVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("either \"True\" or \"False\"")
    }

    fn visit_bool<E: Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_str<E: Error>(self, value: &str) -> Result<Self::Value, E> {
        match value {
            "True" => Ok(true),
            "False" => Ok(false),
            other => Err(E::invalid_value(Unexpected::Str(other), &self)),
        }
    }
}

fn verdict<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(VerdictVisitor)
}
