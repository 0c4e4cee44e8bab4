//! The session protocol handler: transport lifecycle and message framing.

use std::fmt;
use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use uuid::Uuid;

use webshell_core::{
    DisplaySurface, Endpoint, SessionMessage, SessionState, SurfaceEvent, TargetIdentity,
};

/// Sent as `stdin` exactly once per successful connect: primes the remote
/// shell with a standard terminal type and clears the screen.
pub const PRIMING_COMMAND: &str = "export TERM=xterm && clear \r";

/// Written to the display on any transport close, clean or not.
pub const CLOSE_NOTICE: &str = "Connection Reset By Peer! Try Refresh.";

/// Written when the endpoint needs TLS but the build carries none.
pub const TRANSPORT_UNSUPPORTED_NOTICE: &str =
    "transport unsupported: wss endpoint requires a build with the `tls` feature";

/// Opens webshell sessions against one endpoint.
///
/// Each [`open`](Self::open) call builds a fresh session with its own
/// transport and lifecycle state; the handler itself holds no per-session
/// state, so one handler can serve any number of concurrent sessions.
#[derive(Debug, Clone)]
pub struct SessionHandler {
    endpoint: Endpoint,
}

impl SessionHandler {
    /// Create a handler for `endpoint`.
    #[must_use]
    pub const fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// The endpoint sessions are opened against.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Open a session to `identity`.
    ///
    /// Writes a connecting indication to the display immediately, then
    /// connects asynchronously. Surface events from `events` are framed and
    /// sent only while the session is `Open`; events at any other time are
    /// dropped silently. Never fails synchronously: precondition and
    /// transport failures surface as display writes plus an `Errored` state
    /// on the returned handle.
    pub fn open(
        &self,
        identity: &TargetIdentity,
        display: Arc<dyn DisplaySurface>,
        events: mpsc::UnboundedReceiver<SurfaceEvent>,
    ) -> SessionHandle {
        let id = Uuid::new_v4();
        let url = self.endpoint.session_url(identity);
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (close_tx, close_rx) = oneshot::channel();

        if self.endpoint.scheme().requires_tls() && !cfg!(feature = "tls") {
            tracing::error!(session = %id, %url, "built without TLS, cannot reach wss endpoint");
            display.write_line(TRANSPORT_UNSUPPORTED_NOTICE);
            let _ = state_tx.send(SessionState::Errored);
            return SessionHandle {
                state: state_rx,
                close_tx: Some(close_tx),
            };
        }

        tracing::info!(session = %id, %url, "opening session");
        display.write(&format!("connecting to pod {}...", identity.pod));
        let _ = state_tx.send(SessionState::Connecting);

        let ctx = SessionContext {
            id,
            display,
            state: state_tx,
        };
        tokio::spawn(session_task(url, ctx, events, close_rx));

        SessionHandle {
            state: state_rx,
            close_tx: Some(close_tx),
        }
    }
}

/// Caller's view of one session.
///
/// Dropping the handle detaches the session; it keeps running until the
/// transport closes. [`close`](Self::close) tears it down explicitly.
#[derive(Debug)]
pub struct SessionHandle {
    state: watch::Receiver<SessionState>,
    close_tx: Option<oneshot::Sender<()>>,
}

impl SessionHandle {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Request teardown. Idempotent: calling twice is a no-op.
    pub fn close(&mut self) {
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait until the session leaves `Connecting`; returns `Open` or a
    /// terminal state.
    pub async fn opened(&mut self) -> SessionState {
        self.wait(|state| state.is_open() || state.is_terminal())
            .await
    }

    /// Wait until the session reaches a terminal state.
    pub async fn closed(&mut self) -> SessionState {
        self.wait(SessionState::is_terminal).await
    }

    async fn wait(&mut self, done: impl Fn(SessionState) -> bool) -> SessionState {
        loop {
            let current = *self.state.borrow_and_update();
            if done(current) {
                return current;
            }
            if self.state.changed().await.is_err() {
                return *self.state.borrow();
            }
        }
    }
}

/// Per-session state shared by the task's transition and display paths.
struct SessionContext {
    id: Uuid,
    display: Arc<dyn DisplaySurface>,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    fn transition(&self, next: SessionState) {
        let prev = self.state.send_replace(next);
        tracing::debug!(session = %self.id, ?prev, ?next, "state transition");
    }

    /// Dispatch one inbound frame payload.
    fn on_text(&self, text: &str) {
        match serde_json::from_str::<SessionMessage>(text) {
            Ok(SessionMessage::Stdout { data }) => self.display.write(&data),
            Ok(msg) => tracing::warn!(
                session = %self.id,
                operation = msg.operation(),
                "invalid inbound operation, dropping message"
            ),
            Err(err) => {
                tracing::warn!(session = %self.id, %err, "malformed session message, dropping");
            }
        }
    }

    /// Transport close: clean closes carry a code and reason, unclean ones
    /// additionally get a blank line. The reset notice is unconditional.
    fn on_close(&self, frame: Option<CloseFrame<'_>>) {
        match frame {
            Some(frame) => tracing::info!(
                session = %self.id,
                code = u16::from(frame.code),
                reason = %frame.reason,
                "connection closed cleanly"
            ),
            None => {
                tracing::warn!(session = %self.id, "connection died");
                self.display.write_line("");
            }
        }
        self.display.write(CLOSE_NOTICE);
        self.transition(SessionState::Closed);
    }

    /// Transport error: surface the message verbatim and release the display.
    fn fail(&self, err: impl fmt::Display) {
        tracing::error!(session = %self.id, %err, "transport error");
        self.display.write(&format!("error: {err}"));
        self.display.teardown();
        self.transition(SessionState::Errored);
    }
}

async fn session_task(
    url: String,
    ctx: SessionContext,
    events: mpsc::UnboundedReceiver<SurfaceEvent>,
    close_rx: oneshot::Receiver<()>,
) {
    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(err) => {
            ctx.fail(err);
            return;
        }
    };

    let (tx, rx) = ws.split();
    run_open_session(tx, rx, ctx, events, close_rx).await;
}

/// Pump one open session until a terminal state.
///
/// Generic over the transport halves so tests can drive it with in-memory
/// channels in place of a live socket.
async fn run_open_session<Tx, Rx, TxErr, RxErr>(
    mut tx: Tx,
    mut rx: Rx,
    ctx: SessionContext,
    mut events: mpsc::UnboundedReceiver<SurfaceEvent>,
    mut close_rx: oneshot::Receiver<()>,
) where
    Tx: Sink<Message, Error = TxErr> + Unpin,
    Rx: Stream<Item = Result<Message, RxErr>> + Unpin,
    TxErr: fmt::Display,
    RxErr: fmt::Display,
{
    // Input that raced ahead of the connection never goes out; only events
    // observed once Open is visible are framed.
    while events.try_recv().is_ok() {}
    ctx.transition(SessionState::Open);

    ctx.display.write("\r");
    if let Err(err) = send_frame(&mut tx, &SessionMessage::stdin(PRIMING_COMMAND)).await {
        ctx.fail(err);
        return;
    }

    let mut events_open = true;
    let mut close_armed = true;
    loop {
        tokio::select! {
            requested = &mut close_rx, if close_armed => {
                if requested.is_ok() {
                    let _ = tx.send(Message::Close(None)).await;
                    tracing::info!(session = %ctx.id, "session closed by caller");
                    ctx.transition(SessionState::Closed);
                    return;
                }
                // Handle dropped without close(): session runs detached.
                close_armed = false;
            }
            event = events.recv(), if events_open => match event {
                Some(event) => {
                    let msg = match event {
                        SurfaceEvent::Input(data) => SessionMessage::stdin(data),
                        SurfaceEvent::Resize { cols, rows } => SessionMessage::resize(cols, rows),
                    };
                    if let Err(err) = send_frame(&mut tx, &msg).await {
                        ctx.fail(err);
                        return;
                    }
                }
                None => events_open = false,
            },
            frame = rx.next() => match frame {
                Some(Ok(Message::Text(text))) => ctx.on_text(&text),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => ctx.on_text(&text),
                    Err(_) => {
                        tracing::warn!(session = %ctx.id, "dropping non-UTF-8 binary frame");
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    ctx.on_close(frame);
                    return;
                }
                // Ping/pong is answered inside the transport.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    ctx.fail(err);
                    return;
                }
                None => {
                    ctx.on_close(None);
                    return;
                }
            },
        }
    }
}

async fn send_frame<Tx, E>(tx: &mut Tx, msg: &SessionMessage) -> Result<(), E>
where
    Tx: Sink<Message, Error = E> + Unpin,
{
    match serde_json::to_string(msg) {
        Ok(json) => tx.send(Message::Text(json)).await,
        Err(err) => {
            tracing::error!(%err, "failed to serialize session message");
            Ok(())
        }
    }
}
