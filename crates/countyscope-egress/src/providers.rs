//! Provider dispatch
//!
//! A closed `ProviderKind` selects the connector; every request goes to
//! exactly one of them.

use crate::{
    census::{CensusConfig, CensusConnector},
    fred::{FredConfig, FredConnector},
    hud::{HudConfig, HudConnector},
};
use countyscope_core::{ApiKey, DataRequest, NormalizedRecord, ProviderKind, provider::Upstream};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One connector per provider plus optional server-side default keys
#[derive(Clone)]
pub struct ProviderSet {
    census: Arc<dyn Upstream>,
    fred: Arc<dyn Upstream>,
    hud: Arc<dyn Upstream>,
    default_keys: HashMap<ProviderKind, ApiKey>,
}

impl ProviderSet {
    pub fn new(
        census: Arc<dyn Upstream>,
        fred: Arc<dyn Upstream>,
        hud: Arc<dyn Upstream>,
    ) -> Self {
        Self {
            census,
            fred,
            hud,
            default_keys: HashMap::new(),
        }
    }

    /// Build the three real connectors
    pub fn from_configs(
        census: CensusConfig,
        fred: FredConfig,
        hud: HudConfig,
    ) -> crate::Result<Self> {
        Ok(Self::new(
            Arc::new(CensusConnector::new(census)?),
            Arc::new(FredConnector::new(fred)?),
            Arc::new(HudConnector::new(hud)?),
        ))
    }

    /// Key used when a request carries none of its own
    pub fn with_default_key(mut self, provider: ProviderKind, key: ApiKey) -> Self {
        self.default_keys.insert(provider, key);
        self
    }

    pub fn get(&self, provider: ProviderKind) -> &Arc<dyn Upstream> {
        match provider {
            ProviderKind::Census => &self.census,
            ProviderKind::Fred => &self.fred,
            ProviderKind::Hud => &self.hud,
        }
    }

    pub fn has_default_key(&self, provider: ProviderKind) -> bool {
        self.default_keys.contains_key(&provider)
    }

    /// Route a request to its provider's connector
    pub async fn dispatch(&self, request: DataRequest) -> countyscope_core::Result<NormalizedRecord> {
        let provider = request.provider;
        debug!(%provider, endpoint = %request.endpoint_kind, "Dispatching data request");

        let request = request.or_credentials(self.default_keys.get(&provider));
        self.get(provider).fetch(request).await
    }
}
