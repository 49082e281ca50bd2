use trivia_api::{quiz::NO_ACTIVE_QUIZ, source::FetchError, App, QuestionSource, RetryPolicy, Upstream};
use core::{future::Future, time::Duration};
use http_body_util::BodyExt;
use hyper::{
    header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE, X_FRAME_OPTIONS},
    Method, Request, Response, StatusCode,
};
use model::opentdb::{ApiResponse, RawQuestion, ResponseCode};

const QUESTIONS: &[(&str, bool)] = &[
    ("Tomatoes are &quot;fruits&quot;.", true),
    ("The moon is made of cheese.", false),
    ("Penguins can fly.", false),
    ("Water boils at 100&deg;C at sea level.", true),
    ("Light is faster than sound.", true),
];

struct Fixed;

impl Upstream for Fixed {
    fn request(&self, amount: usize) -> impl Future<Output = Result<ApiResponse, FetchError>> + Send {
        let results = QUESTIONS
            .iter()
            .take(amount)
            .map(|&(question, correct_answer)| RawQuestion { question: question.into(), correct_answer })
            .collect();
        core::future::ready(Ok(ApiResponse { response_code: ResponseCode::Success, results }))
    }
}

struct Down;

impl Upstream for Down {
    fn request(&self, _: usize) -> impl Future<Output = Result<ApiResponse, FetchError>> + Send {
        core::future::ready(Err(FetchError::Status(StatusCode::BAD_GATEWAY)))
    }
}

fn policy() -> RetryPolicy {
    RetryPolicy { attempts: 3, delay: Duration::ZERO, timeout: Duration::from_secs(1) }
}

fn app<U: Upstream>(upstream: U) -> App<U> {
    App::new(QuestionSource::new(upstream, 5, policy()), "integration-secret")
}

async fn send<U: Upstream>(app: &App<U>, method: Method, path: &str, cookie: Option<&str>) -> Response<String> {
    let mut req = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        req = req.header(COOKIE, cookie);
    }
    let res = app.respond(req.body(()).unwrap()).await;
    let (parts, body) = res.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    Response::from_parts(parts, String::from_utf8(bytes.to_vec()).unwrap())
}

fn location<B>(res: &Response<B>) -> &str {
    res.headers()[LOCATION].to_str().unwrap()
}

/// The `name=value` pair of the session cookie.
fn cookie_of<B>(res: &Response<B>) -> String {
    let header = res.headers()[SET_COOKIE].to_str().unwrap();
    header.split(';').next().unwrap().to_owned()
}

#[tokio::test(flavor = "current_thread")]
async fn health_checks_report_service_status() {
    let app = app(Fixed);
    for (path, status) in [("/health", "healthy"), ("/readiness", "ready")] {
        let res = send(&app, Method::GET, path, None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert!(res.headers().get(SET_COOKIE).is_none());
        assert_eq!(res.headers()[X_FRAME_OPTIONS], "DENY");

        let json: serde_json::Value = serde_json::from_str(res.body()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": status, "service": "quiz-app" }));
    }
    assert!(app.store().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_routes_and_methods_are_rejected() {
    let app = app(Fixed);

    let res = send(&app, Method::GET, "/nowhere", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[X_FRAME_OPTIONS], "DENY");

    let res = send(&app, Method::GET, "/vote/up", None).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let res = send(&app, Method::POST, "/vote/up/again", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(&app, Method::POST, "/quiz", None).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_without_session_redirects_to_start() {
    let app = app(Fixed);
    let res = send(&app, Method::GET, "/quiz", None).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");

    let cookie = cookie_of(&res);
    let res = send(&app, Method::GET, "/", Some(&cookie)).await;
    assert_eq!(location(&res), "/quiz");
    assert!(res.headers().get(SET_COOKIE).is_none());

    let res = send(&app, Method::GET, "/quiz", Some(&cookie)).await;
    assert!(res.body().contains(NO_ACTIVE_QUIZ));
}

#[tokio::test(flavor = "current_thread")]
async fn plays_a_full_round() {
    let app = app(Fixed);

    let res = send(&app, Method::GET, "/", None).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/quiz");
    let cookie = cookie_of(&res);
    assert!(cookie.starts_with("sid="));

    let res = send(&app, Method::GET, "/quiz", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert!(res.body().contains("Question 1 of 5"));
    assert!(res.body().contains("Tomatoes are \"fruits\"."));

    let mut last = None;
    for action in ["up", "down", "up", "down", "up"] {
        let res = send(&app, Method::POST, &format!("/vote/{action}"), Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        last = Some(location(&res).to_owned());
    }
    assert_eq!(last.as_deref(), Some("/summary"));

    let res = send(&app, Method::GET, "/quiz", Some(&cookie)).await;
    assert_eq!(location(&res), "/summary");

    let res = send(&app, Method::GET, "/summary", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.body().contains("You scored 3 out of 5."));
    assert!(res.body().contains("You agreed 👍 to the last question."));
    assert!(res.body().contains("Water boils at 100°C at sea level."));

    // The results are shown only once
    let res = send(&app, Method::GET, "/quiz", Some(&cookie)).await;
    assert_eq!(location(&res), "/");
    let res = send(&app, Method::GET, "/summary", Some(&cookie)).await;
    assert_eq!(location(&res), "/");
}

#[tokio::test(flavor = "current_thread")]
async fn invalid_vote_keeps_progress() {
    let app = app(Fixed);
    let cookie = cookie_of(&send(&app, Method::GET, "/", None).await);
    send(&app, Method::POST, "/vote/up", Some(&cookie)).await;

    let res = send(&app, Method::POST, "/vote/sideways", Some(&cookie)).await;
    assert_eq!(location(&res), "/quiz");

    let res = send(&app, Method::GET, "/quiz", Some(&cookie)).await;
    assert!(res.body().contains("Question 2 of 5"));
    assert!(res.body().contains("Invalid action. Please use the provided buttons."));
}

#[tokio::test(flavor = "current_thread")]
async fn play_again_starts_over() {
    let app = app(Fixed);
    let cookie = cookie_of(&send(&app, Method::GET, "/", None).await);
    send(&app, Method::POST, "/vote/down", Some(&cookie)).await;

    let res = send(&app, Method::GET, "/play-again", Some(&cookie)).await;
    assert_eq!(location(&res), "/");
    send(&app, Method::GET, "/", Some(&cookie)).await;

    let res = send(&app, Method::GET, "/quiz", Some(&cookie)).await;
    assert!(res.body().contains("Question 1 of 5"));
}

#[tokio::test(flavor = "current_thread")]
async fn cookieless_requests_with_nothing_to_remember_are_not_stored() {
    let app = app(Fixed);
    for _ in 0..100 {
        let res = send(&app, Method::GET, "/play-again", None).await;
        assert_eq!(location(&res), "/");
        assert!(res.headers().get(SET_COOKIE).is_none());
    }
    assert!(app.store().is_empty());

    // A pending notice is worth a session
    let res = send(&app, Method::POST, "/vote/up", None).await;
    assert_eq!(location(&res), "/");
    assert!(res.headers().get(SET_COOKIE).is_some());
    assert_eq!(app.store().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn forged_cookie_gets_a_fresh_session() {
    let app = app(Fixed);
    let cookie = cookie_of(&send(&app, Method::GET, "/", None).await);
    let (head, last) = cookie.split_at(cookie.len() - 1);
    let forged = format!("{head}{}", if last == "0" { '1' } else { '0' });

    let res = send(&app, Method::GET, "/quiz", Some(&forged)).await;
    assert_eq!(location(&res), "/");
    assert_ne!(cookie_of(&res), cookie);
    assert_eq!(app.store().len(), 2);
}

#[tokio::test(flavor = "current_thread")]
async fn unreachable_api_uses_fallback_questions() {
    let app = app(Down);
    let cookie = cookie_of(&send(&app, Method::GET, "/", None).await);

    let res = send(&app, Method::GET, "/quiz", Some(&cookie)).await;
    let body = res.body();
    assert!(body.contains("The sky is blue."));
    assert!(body.contains("Attempt 3 failed: server responded with 502 Bad Gateway"));
    assert!(body.contains("Using fallback questions due to API failure."));

    // Notices are only shown once
    let res = send(&app, Method::GET, "/quiz", Some(&cookie)).await;
    assert!(!res.body().contains("Using fallback questions"));
}
