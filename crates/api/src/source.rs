mod error;

pub use error::FetchError;

use core::{future::Future, time::Duration};
use http_body_util::{BodyExt, Empty};
use hyper::{
    body::{Buf, Bytes},
    Uri,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use model::{
    opentdb::{ApiResponse, RawQuestion, ResponseCode},
    Question,
};
use std::borrow::Cow;
use tokio::time;

const FALLBACK: [(&str, bool); 5] = [
    ("The sky is blue.", true),
    ("Cats can fly.", false),
    ("Python is a programming language.", true),
    ("The Earth is flat.", false),
    ("Fire is cold.", false),
];

pub const FALLBACK_NOTICE: &str = "Using fallback questions due to API failure.";

/// The first `amount` built-in questions.
pub fn fallback(amount: usize) -> Vec<Question> {
    FALLBACK.iter().take(amount).map(|&(text, answer)| Question::new(text, answer)).collect()
}

/// A remote service that hands out batches of true/false questions.
pub trait Upstream: Send + Sync {
    fn request(&self, amount: usize) -> impl Future<Output = Result<ApiResponse, FetchError>> + Send;
}

/// Client for the public Open Trivia Database.
pub struct OpenTdb {
    endpoint: Box<str>,
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
}

impl OpenTdb {
    pub const ENDPOINT: &'static str = "https://opentdb.com/api.php";

    pub fn new(endpoint: &str) -> Self {
        let connector = HttpsConnectorBuilder::new().with_webpki_roots().https_or_http().enable_http1().build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { endpoint: endpoint.into(), client }
    }
}

impl Default for OpenTdb {
    fn default() -> Self {
        Self::new(Self::ENDPOINT)
    }
}

impl Upstream for OpenTdb {
    async fn request(&self, amount: usize) -> Result<ApiResponse, FetchError> {
        let uri: Uri = format!("{}?amount={amount}&type=boolean", self.endpoint).parse()?;
        let res = self.client.get(uri).await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let reader = res.into_body().collect().await?.aggregate().reader();
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Bounds how long and how often the remote service is consulted.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Pause between consecutive attempts. Never applied after the last one.
    pub delay: Duration,
    /// Upper bound on a single attempt, including reading the body.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3, delay: Duration::from_secs(2), timeout: Duration::from_secs(10) }
    }
}

#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub endpoint: Box<str>,
    /// Number of questions per quiz.
    pub amount: usize,
    pub policy: RetryPolicy,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { endpoint: OpenTdb::ENDPOINT.into(), amount: 5, policy: RetryPolicy::default() }
    }
}

/// Questions ready to be asked along with any diagnostics worth showing the player.
#[derive(Debug, Default)]
pub struct Fetched {
    pub questions: Vec<Question>,
    pub notices: Vec<String>,
}

fn describe(code: ResponseCode) -> Cow<'static, str> {
    match code {
        ResponseCode::NoResults => "No questions available. Please try again later.".into(),
        ResponseCode::InvalidParameter => "Invalid parameters provided to the API.".into(),
        ResponseCode::TokenNotFound => "API token not found.".into(),
        ResponseCode::TokenEmpty => "API token has returned all possible questions.".into(),
        ResponseCode::RateLimit => "Too many requests to the API. Please wait a moment.".into(),
        ResponseCode::Success | ResponseCode::Unknown(_) => {
            format!("The API returned an unexpected response code: {}.", code.code()).into()
        }
    }
}

fn decode(raw: RawQuestion) -> Question {
    let text = html_escape::decode_html_entities(&raw.question);
    Question::new(text, raw.correct_answer)
}

/// Fetches questions from an [`Upstream`], retrying on failure and falling back to the
/// built-in list once every attempt is exhausted. Never fails.
pub struct QuestionSource<U> {
    upstream: U,
    amount: usize,
    policy: RetryPolicy,
}

impl QuestionSource<OpenTdb> {
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(OpenTdb::new(&config.endpoint), config.amount, config.policy)
    }
}

impl<U: Upstream> QuestionSource<U> {
    pub fn new(upstream: U, amount: usize, policy: RetryPolicy) -> Self {
        Self { upstream, amount, policy }
    }

    pub async fn fetch(&self) -> Fetched {
        log::info!("Fetching {} questions from the trivia API.", self.amount);

        let mut notices = Vec::new();
        for attempt in 1..=self.policy.attempts {
            let result = match time::timeout(self.policy.timeout, self.upstream.request(self.amount)).await {
                Ok(result) => result,
                Err(elapsed) => Err(elapsed.into()),
            };

            match result {
                Ok(ApiResponse { response_code: ResponseCode::Success, results }) => {
                    let questions: Vec<_> = results.into_iter().map(decode).collect();
                    log::info!("Successfully fetched {} questions.", questions.len());
                    return Fetched { questions, notices };
                }
                Ok(ApiResponse { response_code, .. }) => {
                    log::warn!("Trivia API returned response code {}.", response_code.code());
                    notices.push(describe(response_code).into_owned());
                }
                Err(err) if err.is_transport() => {
                    log::error!("Trivia API request attempt {attempt} failed: {err}");
                    notices.push(format!("Attempt {attempt} failed: {err}"));
                }
                Err(err) => {
                    log::error!("Unexpected error during trivia API request: {err}");
                    notices.push(format!("Unexpected error occurred: {err}"));
                }
            }

            if attempt < self.policy.attempts {
                time::sleep(self.policy.delay).await;
            }
        }

        log::info!("Using fallback questions due to API failure.");
        notices.push(FALLBACK_NOTICE.into());
        Fetched { questions: fallback(self.amount), notices }
    }
}
