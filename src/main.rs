use std::io::{self, Write};

use clap::Parser;
use medtrack_chat::config::ConfigError;
use medtrack_chat::render::{FeedPrinter, status_line};
use medtrack_chat::{ChatConfig, ChatSession, SendOutcome, auth};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("authentication failed: {0}")]
    Auth(#[from] auth::AuthError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "medtrack-chat", about = "Terminal client for the MedTrack pharmacy assistant")]
struct Cli {
    #[arg(long, env = "MEDTRACK_API_BASE")]
    api_base: String,

    #[arg(long, env = "MEDTRACK_WS_BASE", help = "Defaults to the API base with a ws(s) scheme")]
    ws_base: Option<String>,

    #[arg(long, env = "MEDTRACK_ACCESS_TOKEN")]
    access_token: Option<String>,

    #[arg(long, env = "MEDTRACK_PLACEHOLDER")]
    placeholder: Option<String>,

    #[arg(long, default_value_t = false, help = "Open the socket without checking /auth/me first")]
    skip_auth_check: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut config = ChatConfig::new(&cli.api_base, cli.ws_base.as_deref())?;
    if let Some(token) = cli.access_token {
        config = config.with_access_token(token);
    }
    if let Some(placeholder) = cli.placeholder {
        config = config.with_placeholder(placeholder);
    }

    if !cli.skip_auth_check {
        auth::verify_session(&config).await?;
    }

    run_chat(&config).await
}

async fn run_chat(config: &ChatConfig) -> Result<(), CliError> {
    let (mut session, mut events) = ChatSession::connect(config);
    let mut feed = session.subscribe();
    let mut connectivity = session.connectivity();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printer = FeedPrinter::default();
    let mut stdout = io::stdout();

    writeln!(stdout, "{}", status_line(*connectivity.borrow_and_update()))?;
    writeln!(stdout, "Ask about dosages, interactions or common FAQs. /quit to leave.")?;

    let mut events_open = true;
    let mut state_open = true;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim() == "/quit" {
                    break;
                }
                if session.send_query(&line) == SendOutcome::Undelivered {
                    writeln!(stdout, "{} query not sent", status_line(*connectivity.borrow()))?;
                }
            }
            event = events.recv(), if events_open => match event {
                Some(event) => {
                    session.handle_event(event);
                }
                None => events_open = false,
            },
            changed = connectivity.changed(), if state_open => {
                if changed.is_err() {
                    state_open = false;
                } else {
                    writeln!(stdout, "{}", status_line(*connectivity.borrow_and_update()))?;
                }
            }
        }

        if feed.has_changed().unwrap_or(false) {
            printer.render(&feed.borrow_and_update(), &mut stdout)?;
        }
    }

    session.close();
    Ok(())
}
