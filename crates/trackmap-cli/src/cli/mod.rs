//! CLI command implementations.
//!
//! - `new` / `migrate` - create or upgrade map files
//! - `apply` - run an edit script through an editing session
//! - `replay` - drive a live view from a recorded feed
//! - `zone` - point-in-zone lookup

pub mod apply;
pub mod common;
pub mod migrate;
pub mod replay;
pub mod zone;

pub use apply::{cmd_apply, ApplyArgs};
pub use migrate::{cmd_migrate, cmd_new};
pub use replay::{cmd_replay, ReplayArgs};
pub use zone::cmd_zone;
