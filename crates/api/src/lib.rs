pub mod quiz;
pub mod render;
pub mod source;
mod util;

pub use source::{OpenTdb, QuestionSource, RetryPolicy, SourceConfig, Upstream};
pub use store::SessionStore;

use http_body_util::Full;
use hyper::{
    body::Bytes,
    header::{HeaderValue, CONTENT_TYPE, LOCATION, SET_COOKIE},
    http::request::Parts,
    Method, Request, Response, StatusCode,
};
use model::Session;
use quiz::Outcome;
use util::session::Signer;

pub type Body = Full<Bytes>;

pub const SERVICE_NAME: &str = "quiz-app";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";

enum Action<'p> {
    Start,
    View,
    Vote(&'p str),
    Summary,
    PlayAgain,
}

enum Endpoint<'p> {
    /// Liveness and readiness checks. Never touches any session.
    Health(&'static str),
    Quiz(Action<'p>),
}

impl<'p> Endpoint<'p> {
    fn parse(path: &'p str) -> Option<Self> {
        Some(match path {
            "/" => Self::Quiz(Action::Start),
            "/quiz" => Self::Quiz(Action::View),
            "/summary" => Self::Quiz(Action::Summary),
            "/play-again" => Self::Quiz(Action::PlayAgain),
            "/health" => Self::Health("healthy"),
            "/readiness" => Self::Health("ready"),
            _ => {
                let action = path.strip_prefix("/vote/")?;
                if action.is_empty() || action.contains('/') {
                    return None;
                }
                Self::Quiz(Action::Vote(action))
            }
        })
    }

    fn method(&self) -> Method {
        match self {
            Self::Quiz(Action::Vote(_)) => Method::POST,
            _ => Method::GET,
        }
    }
}

fn empty(status: StatusCode) -> Response<Body> {
    let mut res = Response::new(Full::new(Bytes::new()));
    *res.status_mut() = status;
    res
}

fn redirect(location: &'static str) -> Response<Body> {
    let mut res = empty(StatusCode::FOUND);
    assert!(res.headers_mut().insert(LOCATION, HeaderValue::from_static(location)).is_none());
    res
}

fn document(content_type: &'static str, body: String) -> Response<Body> {
    let mut res = Response::new(Full::from(body));
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type)).is_none());
    res
}

fn health(status: &str) -> Response<Body> {
    let body = serde_json::json!({ "status": status, "service": SERVICE_NAME });
    document(APPLICATION_JSON, body.to_string())
}

/// The whole web application: one question source shared by every visitor, and one
/// server-side session per browser.
pub struct App<U = OpenTdb> {
    store: SessionStore,
    source: QuestionSource<U>,
    signer: Signer,
}

impl<U: Upstream> App<U> {
    pub fn new(source: QuestionSource<U>, secret: &str) -> Self {
        Self { store: SessionStore::default(), source, signer: Signer::new(secret) }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Handles one request. Always produces a response carrying the security headers.
    pub async fn respond<B>(&self, req: Request<B>) -> Response<Body> {
        let (parts, _) = req.into_parts();
        let mut res = match self.try_respond(&parts).await {
            Ok(res) => res,
            Err(status) => empty(status),
        };
        log::debug!("{} {} -> {}", parts.method, parts.uri.path(), res.status());
        util::headers::secure(res.headers_mut());
        res
    }

    async fn try_respond(&self, parts: &Parts) -> Result<Response<Body>, StatusCode> {
        let endpoint = Endpoint::parse(parts.uri.path()).ok_or(StatusCode::NOT_FOUND)?;
        if parts.method != endpoint.method() {
            return Err(StatusCode::METHOD_NOT_ALLOWED);
        }

        let action = match endpoint {
            Endpoint::Health(status) => return Ok(health(status)),
            Endpoint::Quiz(action) => action,
        };

        let stored = util::session::extract_session(&parts.headers)
            .and_then(|cookie| self.signer.verify(cookie))
            .and_then(|id| self.store.get(id));

        // Every request of the same browser waits here for its turn
        if let Some(handle) = stored {
            let mut session = handle.lock().await;
            return Ok(self.dispatch(action, &mut session).await);
        }

        // Browsers without a valid cookie are only remembered once there is something to remember
        let mut session = Session::default();
        let mut res = self.dispatch(action, &mut session).await;
        if session.quiz.is_some() || !session.notices.is_empty() {
            let (id, _) = self.store.insert(session);
            let cookie =
                HeaderValue::from_str(&self.signer.set_cookie(&id)).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
            res.headers_mut().insert(SET_COOKIE, cookie);
        }

        Ok(res)
    }

    async fn dispatch(&self, action: Action<'_>, session: &mut Session) -> Response<Body> {
        let outcome = match action {
            Action::Start => quiz::start(session, &self.source).await,
            Action::View => quiz::view(session),
            Action::Vote(vote) => quiz::vote(session, vote),
            Action::Summary => quiz::summary(session),
            Action::PlayAgain => quiz::play_again(session),
        };

        match outcome {
            Outcome::Redirect(route) => redirect(route.path()),
            Outcome::Render(page) => {
                let notices = session.take_notices();
                document(TEXT_HTML, render::page(&page, &notices))
            }
        }
    }
}
