pub mod analytics;
pub mod cache;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod selection;
pub mod srs;
pub mod state;
pub mod store;
pub mod sync;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
