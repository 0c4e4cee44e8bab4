//! Session lifecycle state.

/// Lifecycle state of one session.
///
/// ```text
/// Idle --open()--> Connecting --transport-open--> Open --transport-close--> Closed
///                      |                           |
///                      +------transport-error------+--> Errored
/// ```
///
/// `Closed` and `Errored` are terminal: no further transport events are
/// processed once entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, connect not yet requested.
    Idle,
    /// Connection attempt in flight.
    Connecting,
    /// Transport confirmed open; traffic flows.
    Open,
    /// Transport closed, cleanly or not.
    Closed,
    /// Transport or connect error.
    Errored,
}

impl SessionState {
    /// Whether outbound traffic is allowed.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether this state is terminal for the session.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }
}
