//! shard-core — shared domain model for Shardhost.
//!
//! Validated identifiers, game profiles, the on-disk data layout of a
//! server container, and display-status derivation. Everything here is
//! plain data; the crates above this one do the I/O.

pub mod ident;
pub mod layout;
pub mod profile;
pub mod status;

pub use ident::{IdentError, Namespace, ServerId};
pub use profile::{GamePackage, ProfileError, ProfileSpec, ProfileTable};
pub use status::DisplayStatus;
