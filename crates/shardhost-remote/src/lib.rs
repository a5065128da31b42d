//! shardhost-remote — file operations inside a running server container.
//!
//! The exec channel is text-oriented, so binary payloads travel
//! base64-encoded through [`codec`]. [`RemoteFileChannel`] builds the shell
//! command for each operation and runs it against the single ready pod for
//! a server; "no running instance" is fatal to the whole call, while
//! individual command failures are reported per path so callers can keep
//! going.

pub mod codec;

mod channel;
mod error;

pub use channel::RemoteFileChannel;
pub use error::{RemoteError, RemoteResult};
