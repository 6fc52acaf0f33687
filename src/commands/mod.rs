//! Command implementations for the SilentPush CLI

pub mod completions;
pub mod install;
pub mod list;
pub mod version;
