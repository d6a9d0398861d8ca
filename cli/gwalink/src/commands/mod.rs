//! CLI command implementations.

pub mod generations;
pub mod hydrate;
pub mod init;
pub mod keywords;
