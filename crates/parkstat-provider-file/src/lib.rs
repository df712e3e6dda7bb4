//! JSON export provider for parkstat
//!
//! This crate implements the snapshot source trait over a JSON export of the
//! whole document tree, so reports can be computed offline.

pub mod data_loader;

pub use data_loader::{FileSource, SNAPSHOT_ENV};
