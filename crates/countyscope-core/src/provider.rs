//! Upstream trait definitions

use crate::{
    Result,
    normalized::NormalizedRecord,
    request::{DataRequest, ProviderKind},
};

/// A connector that turns one `DataRequest` into exactly one outbound call
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    /// Which provider this connector talks to
    fn kind(&self) -> ProviderKind;

    /// Validate, call upstream once, classify, and normalize
    async fn fetch(&self, request: DataRequest) -> Result<NormalizedRecord>;

    /// Endpoint kinds this connector accepts, for readiness reporting
    fn endpoint_kinds(&self) -> Vec<&'static str> {
        Vec::new()
    }
}
