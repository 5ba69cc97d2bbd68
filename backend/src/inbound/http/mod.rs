//! HTTP inbound adapter exposing the collection proxy and health probes.

pub mod collection;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
