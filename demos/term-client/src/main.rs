//! Interactive terminal client for webshell endpoints.
//!
//! Connects the local terminal to a container shell behind a webshell
//! gateway:
//!
//! ```text
//! term-client [--tls] <host> '<query>'
//! term-client localhost:8080 'namespace=default&pod=web-0&container_name=app'
//! ```
//!
//! The query string names the target exactly as the gateway's page URL
//! would. Press Ctrl+] to leave the session.

mod surface;

use std::sync::Arc;

use anyhow::bail;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use surface::{RawTerminal, encode_key};
use webshell_core::{DisplaySurface, Endpoint, Scheme, SurfaceEvents, TargetIdentity};
use webshell_session::SessionHandler;

const USAGE: &str = "usage: term-client [--tls] <host> '<query>'
example: term-client localhost:8080 'namespace=default&pod=web-0&container_name=app'";

#[derive(Debug)]
struct Args {
    host: String,
    query: String,
    tls: bool,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut tls = false;
        let mut positional = Vec::new();
        for arg in args {
            match arg.as_str() {
                "--tls" => tls = true,
                "--help" | "-h" => bail!("{USAGE}"),
                _ => positional.push(arg),
            }
        }
        if positional.len() != 2 {
            bail!("{USAGE}");
        }
        let query = positional.pop().unwrap_or_default();
        let host = positional.pop().unwrap_or_default();
        Ok(Self { host, query, tls })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix into the session display.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let identity = match TargetIdentity::from_query(&args.query) {
        Ok(identity) => identity,
        Err(err) => {
            eprintln!("cannot open webshell: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        namespace = %identity.namespace,
        pod = %identity.pod,
        container = %identity.container_name,
        "resolved target"
    );

    let endpoint = Endpoint::new(args.host, Scheme::from_secure(args.tls));
    tracing::info!(url = %endpoint.session_url(&identity), "session endpoint");

    let terminal = Arc::new(RawTerminal::open()?);
    let (events, events_rx) = SurfaceEvents::channel();
    let mut handle = SessionHandler::new(endpoint).open(&identity, terminal.clone(), events_rx);

    if handle.opened().await.is_open() {
        // Fit the remote viewport to the local terminal right after opening.
        if let Ok((cols, rows)) = crossterm::terminal::size() {
            let _ = events.send_resize(cols, rows);
        }
    }

    // Run until the transport ends or the local escape asks to leave.
    let mut input = tokio::spawn(pump_input(events));
    let transport_end = {
        let closed = handle.closed();
        tokio::pin!(closed);
        tokio::select! {
            state = &mut closed => Some(state),
            _ = &mut input => None,
        }
    };
    let end_state = match transport_end {
        Some(state) => state,
        None => {
            handle.close();
            handle.closed().await
        }
    };
    input.abort();
    terminal.teardown();

    tracing::info!(?end_state, "session ended");
    Ok(())
}

/// Forward terminal input and resize events until the local escape fires.
async fn pump_input(events: SurfaceEvents) {
    let mut stream = EventStream::new();
    while let Some(event) = stream.next().await {
        match event {
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if is_local_escape(&key) {
                    tracing::info!("local escape pressed, leaving session");
                    return;
                }
                if let Some(data) = encode_key(&key) {
                    if events.send_input(data).is_err() {
                        return;
                    }
                }
            }
            Ok(Event::Resize(cols, rows)) => {
                tracing::debug!(cols, rows, "resize");
                if events.send_resize(cols, rows).is_err() {
                    return;
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(%err, "input stream error");
                return;
            }
        }
    }
}

/// Ctrl+] leaves the session without touching the remote shell.
fn is_local_escape(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char(']') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_query() {
        let args = Args::parse(
            ["localhost:8080", "namespace=a&pod=b&container_name=c"]
                .into_iter()
                .map(String::from),
        )
        .unwrap();
        assert_eq!(args.host, "localhost:8080");
        assert_eq!(args.query, "namespace=a&pod=b&container_name=c");
        assert!(!args.tls);
    }

    #[test]
    fn tls_flag_is_recognized() {
        let args = Args::parse(
            ["--tls", "gw.example.com", "namespace=a&pod=b&container_name=c"]
                .into_iter()
                .map(String::from),
        )
        .unwrap();
        assert!(args.tls);
    }

    #[test]
    fn missing_arguments_fail_with_usage() {
        let err = Args::parse(["onlyhost".to_string()].into_iter()).unwrap_err();
        assert!(err.to_string().contains("usage:"));
    }

    #[test]
    fn local_escape_is_ctrl_right_bracket() {
        let key = KeyEvent::new(KeyCode::Char(']'), KeyModifiers::CONTROL);
        assert!(is_local_escape(&key));
        let key = KeyEvent::new(KeyCode::Char(']'), KeyModifiers::NONE);
        assert!(!is_local_escape(&key));
    }
}
