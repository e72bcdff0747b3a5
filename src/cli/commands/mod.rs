//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod analyze;
pub mod audit;
pub mod cleanup;
pub mod collections;
pub mod common;
pub mod dump;
pub mod import_csv;
pub mod init;
pub mod integrity;
pub mod normalize;
pub mod preview;
pub mod tags;
pub mod validate;
pub mod verify;
