//! Session protocol handler for the webshell client.
//!
//! Owns one session's transport: connects to the endpoint derived from a
//! target identity, frames display-surface events into outbound session
//! messages, renders inbound `stdout` messages onto the display surface, and
//! drives the `Idle -> Connecting -> Open -> Closed` / `Errored` lifecycle.

pub mod handler;

pub use handler::{
    CLOSE_NOTICE, PRIMING_COMMAND, SessionHandle, SessionHandler, TRANSPORT_UNSUPPORTED_NOTICE,
};
