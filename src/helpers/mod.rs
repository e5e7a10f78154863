//! General useful bits and bobs

use super::*;

pub mod config;
mod filesystem;
mod format_slotmap_key;
mod or_log;
#[cfg(test)]
mod test_helpers;

pub use filesystem::{real_filesystem, Filesystem, FilesystemTrait};
pub use format_slotmap_key::format_slotmap_key;
pub use or_log::OrLog;
#[cfg(test)]
pub use test_helpers::*;
