//! Realtime document store provider for parkstat
//!
//! This crate implements the snapshot source trait over the store's REST
//! interface, where every document path is readable as `<path>.json`.

pub mod data_loader;

pub use data_loader::{DB_AUTH_ENV, DB_URL_ENV, RtdbSource};
