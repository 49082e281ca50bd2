use api::{App, QuestionSource, SourceConfig};
use core::{convert::Infallible, pin::pin, time::Duration};
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::{net::TcpListener, runtime::Runtime, signal, time};

const PORT: u16 = 8080;
const INSECURE_SECRET: &str = "dev-key-change-in-production";
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

fn main() -> anyhow::Result<()> {
    // Parse environment variables
    let debug = env::var("DEBUG").is_ok_and(|val| val.eq_ignore_ascii_case("true"));
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let secret = env::var("SECRET_KEY").unwrap_or_else(|_| {
        log::warn!("SECRET_KEY is not set. Falling back to an insecure development key.");
        INSECURE_SECRET.into()
    });

    let mut config = SourceConfig::default();
    if let Ok(endpoint) = env::var("TRIVIA_API_URL") {
        config.endpoint = endpoint.into_boxed_str();
    }
    if let Ok(count) = env::var("QUESTION_COUNT") {
        config.amount = count.parse()?;
    }

    // Initialize service handler
    let runtime = Runtime::new()?;
    let app = Arc::new(App::new(QuestionSource::from_config(&config), &secret));

    // Run the server
    runtime.block_on(serve(app))
}

async fn serve(app: Arc<App>) -> anyhow::Result<()> {
    let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, PORT).into();
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on {addr}.");

    let sweeper = app.clone();
    tokio::spawn(async move {
        let mut interval = time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.store().purge_idle(SESSION_TTL);
        }
    });

    let mut stop = pin!(signal::ctrl_c());
    loop {
        let stream = tokio::select! {
            biased;
            result = &mut stop => {
                result?;
                break;
            }
            conn = listener.accept() => match conn {
                Ok((stream, _)) => stream,
                Err(err) => {
                    log::error!("Failed to accept connection: {err}");
                    continue;
                }
            },
        };

        let app = app.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let app = app.clone();
                async move { Ok::<_, Infallible>(app.respond(req).await) }
            });
            if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                log::error!("Connection failed: {err}");
            }
        });
    }

    log::info!("Shutting down.");
    Ok(())
}
