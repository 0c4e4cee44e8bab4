//! Display surface capability consumed by the session handler.

use tokio::sync::mpsc;

/// The terminal rendering side of a session, external to the core.
///
/// Output written here is raw: escape sequences are passed through verbatim
/// and interpretation is the surface's business. `teardown` releases any
/// resources that need explicit teardown (raw mode, widget handles); it may
/// be called more than once.
pub trait DisplaySurface: Send + Sync {
    /// Write text verbatim.
    fn write(&self, text: &str);

    /// Write text followed by a line break.
    fn write_line(&self, text: &str);

    /// Release surface resources.
    fn teardown(&self);
}

/// An input-side event produced by the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Characters typed by the user.
    Input(String),
    /// Viewport dimensions changed.
    Resize { cols: u16, rows: u16 },
}

/// Send error.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("session is gone")]
    SessionGone,
}

/// Producer half of the surface event channel.
///
/// The session handler consumes the receiver; once the session reaches a
/// terminal state the receiver is dropped and sends fail with
/// [`SendError::SessionGone`]. Events are fire-and-forget — there is no
/// acknowledgment and no backpressure.
#[derive(Debug, Clone)]
pub struct SurfaceEvents {
    tx: mpsc::UnboundedSender<SurfaceEvent>,
}

impl SurfaceEvents {
    /// Create the event channel.
    ///
    /// Returns the producer and the receiver to hand to the session handler.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SurfaceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Send typed input.
    ///
    /// # Errors
    /// Returns an error if the session is gone.
    pub fn send_input(&self, data: impl Into<String>) -> Result<(), SendError> {
        self.tx
            .send(SurfaceEvent::Input(data.into()))
            .map_err(|_| SendError::SessionGone)
    }

    /// Send new viewport dimensions.
    ///
    /// # Errors
    /// Returns an error if the session is gone.
    pub fn send_resize(&self, cols: u16, rows: u16) -> Result<(), SendError> {
        self.tx
            .send(SurfaceEvent::Resize { cols, rows })
            .map_err(|_| SendError::SessionGone)
    }
}
