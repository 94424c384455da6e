//! CountyScope Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout CountyScope:
//! - Provider-agnostic data requests
//! - Normalized record types consumed by the dashboard
//! - The upstream error taxonomy
//! - The `Upstream` trait implemented by provider connectors

pub mod error;
pub mod normalized;
pub mod provider;
pub mod request;

pub use error::{ApiError, ErrorKind, Result};
pub use normalized::{NormalizedRecord, RecordData, RegionEntry};
pub use provider::Upstream;
pub use request::{ApiKey, DataRequest, ProviderKind, Region};
