//! Barter Trade notification client.
//!
//! # Usage
//!
//! ```bash
//! # Listen for chat notifications as user u-1
//! barter-notify --api-origin http://localhost:8000 --user u-1
//!
//! # Same, over the WebSocket subscription
//! BARTER_API_ORIGIN=https://api.example.com barter-notify --user u-1 --transport ws
//! ```
//!
//! Commands are read from stdin; see [`barter_notify::command`].

use std::{
    io::{self, BufRead},
    sync::Arc,
    thread,
    time::Duration,
};

use barter_app::{NotifierConfig, NotifierEvent, Runtime, Session};
use barter_client::{api::ApiConfig, transport::BackendKind};
use barter_core::{ReconnectConfig, UserId};
use barter_notify::{Command, LiveDriver, TerminalPresenter, TerminalRouter};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Barter Trade live chat notifications
#[derive(Parser, Debug)]
#[command(name = "barter-notify")]
#[command(about = "Live chat notifications for Barter Trade")]
#[command(version)]
struct Args {
    /// Chat API origin, e.g. https://api.example.com
    #[arg(long, env = "BARTER_API_ORIGIN")]
    api_origin: String,

    /// User to sign in as. Without it, use `login <id>` on stdin.
    #[arg(short, long, env = "BARTER_USER_ID")]
    user: Option<String>,

    /// Live channel transport (sse or ws)
    #[arg(long, env = "BARTER_TRANSPORT", default_value = "sse")]
    transport: BackendKind,

    /// Consecutive failures before giving up
    #[arg(long, env = "BARTER_MAX_ATTEMPTS", default_value = "5")]
    max_attempts: u32,

    /// Base reconnect delay in milliseconds
    #[arg(long, env = "BARTER_BASE_DELAY_MS", default_value = "1000")]
    base_delay_ms: u64,

    /// Longest reconnect delay in milliseconds
    #[arg(long, env = "BARTER_DELAY_CEILING_MS", default_value = "30000")]
    delay_ceiling_ms: u64,

    /// Seconds a notification stays visible
    #[arg(long, env = "BARTER_DISPLAY_SECS", default_value = "5")]
    display_secs: u64,

    /// REST request timeout in seconds
    #[arg(long, env = "BARTER_REQUEST_TIMEOUT_SECS", default_value = "10")]
    request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            reconnect: ReconnectConfig {
                max_attempts: self.max_attempts,
                base_delay: Duration::from_millis(self.base_delay_ms),
                delay_ceiling: Duration::from_millis(self.delay_ceiling_ms),
            },
            display_for: Duration::from_secs(self.display_secs),
        }
    }

    fn api_config(&self) -> ApiConfig {
        ApiConfig { request_timeout: Duration::from_secs(self.request_timeout_secs), ..ApiConfig::default() }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    tracing::info!("barter-notify starting");

    let session = Arc::new(Session::new(args.user.clone().map(UserId::new)));

    let (router_tx, mut router_rx) = mpsc::channel(16);
    let driver = LiveDriver::connect(
        &args.api_origin,
        args.transport,
        &args.api_config(),
        TerminalPresenter::new(io::stdout()),
        TerminalRouter::new(router_tx),
    )?;
    let inputs = driver.inputs();

    // Navigation requests re-enter as ordinary inputs
    let forward = inputs.clone();
    tokio::spawn(async move {
        while let Some(event) = router_rx.recv().await {
            if forward.send(event).await.is_err() {
                break;
            }
        }
    });

    let shutdown = inputs.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, shutting down");
            let _ = shutdown.send(NotifierEvent::Teardown).await;
        }
    });

    // A plain thread, so a pending stdin read never holds up shutdown
    let commands = Arc::clone(&session);
    thread::Builder::new().name("stdin".into()).spawn(move || read_commands(&commands, &inputs))?;

    let runtime = Runtime::new(driver, args.notifier_config(), session.subscribe());

    let mut unread = runtime.unread_count();
    tokio::spawn(async move {
        while unread.changed().await.is_ok() {
            let count = *unread.borrow_and_update();
            tracing::info!(count, "unread conversations");
        }
    });

    runtime.run().await?;

    tracing::info!("barter-notify stopped");
    Ok(())
}

/// Feed stdin commands into the session and the notifier.
fn read_commands(session: &Session, inputs: &mpsc::Sender<NotifierEvent>) {
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            },
        };

        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Login(user)) => session.sign_in(user),
            Ok(Command::Logout) => session.sign_out(),
            Ok(Command::Notifier(event)) => {
                if inputs.blocking_send(event).is_err() {
                    break;
                }
            },
            Err(e) => tracing::warn!(error = %e, "bad command"),
        }
    }
}
