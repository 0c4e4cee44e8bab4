//! Core types for the webshell session client.
//!
//! This crate provides the leaf building blocks:
//! - `TargetIdentity` - The namespace/pod/container triple naming the remote end
//! - `Endpoint` - Deterministic session URL derivation
//! - `SessionMessage` - The stdin/resize/stdout wire protocol
//! - `SessionState` - Lifecycle state of one session
//! - `DisplaySurface` / `SurfaceEvents` - The terminal capability the client drives

pub mod endpoint;
pub mod identity;
pub mod message;
pub mod state;
pub mod surface;

pub use endpoint::{Endpoint, Scheme};
pub use identity::{IdentityError, TargetIdentity};
pub use message::SessionMessage;
pub use state::SessionState;
pub use surface::{DisplaySurface, SendError, SurfaceEvent, SurfaceEvents};
