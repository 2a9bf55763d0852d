//! Concrete provider adapters (spec §4.B), each talking to a configurable
//! base URL so it is fully testable offline via `wiremock` without any live
//! network access. `register_all` is the composition root's entry point for
//! populating a [`registry::Registry`] with every adapter this rewrite
//! ships, mirroring the way `quote-aggregator`'s binary crate wires
//! dependencies together at process start (Design Notes §9: explicit
//! registration instead of runtime reflection).

pub mod http;
pub mod instarem;
pub mod remitly;
pub mod wise;
pub mod worldremit;

use std::{collections::HashMap, sync::Arc};

use provider_core::AdapterContext;
use registry::Registry;
use url::Url;

/// Per-provider base URL, overridable via `PROVIDER_BASE_URL_<ID>`
/// environment variables — the adapter-endpoint counterpart to
/// `quote_config::provider_credentials`'s `PROVIDER_CREDENTIALS_<ID>`.
pub struct ProviderEndpoints {
    urls: HashMap<&'static str, Url>,
}

impl ProviderEndpoints {
    pub fn defaults() -> Self {
        let mut urls = HashMap::new();
        urls.insert(wise::PROVIDER_ID, "https://api.wise.example/".parse().unwrap());
        urls.insert(remitly::PROVIDER_ID, "https://api.remitly.example/".parse().unwrap());
        urls.insert(instarem::PROVIDER_ID, "https://api.instarem.example/".parse().unwrap());
        urls.insert(worldremit::PROVIDER_ID, "https://api.worldremit.example/".parse().unwrap());
        Self { urls }
    }

    /// Overrides any entry found as `PROVIDER_BASE_URL_<ID>` (e.g.
    /// `PROVIDER_BASE_URL_WISE`) in the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        for (id, url) in self.urls.iter_mut() {
            let var = format!("PROVIDER_BASE_URL_{}", id.to_ascii_uppercase());
            if let Ok(value) = std::env::var(&var) {
                if let Ok(parsed) = value.parse() {
                    *url = parsed;
                }
            }
        }
        self
    }

    fn get(&self, id: &str) -> Url {
        self.urls
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("no base URL configured for provider {id}"))
    }
}

/// Registers every adapter this rewrite ships, in the stable order spec §4.E
/// requires for `all_providers`. Adding a fifth adapter is a one-line
/// addition here; nothing else in the workspace needs to change, which is
/// the point of the explicit-registry Design Note.
pub fn register_all(registry: &mut Registry, context: Arc<AdapterContext>, endpoints: &ProviderEndpoints) {
    {
        let context = context.clone();
        let base_url = endpoints.get(wise::PROVIDER_ID);
        registry.register(wise::PROVIDER_ID, "Wise", move || {
            Arc::new(wise::WiseAdapter::new(context.clone(), base_url.clone()))
        });
    }
    {
        let context = context.clone();
        let base_url = endpoints.get(remitly::PROVIDER_ID);
        registry.register(remitly::PROVIDER_ID, "Remitly", move || {
            Arc::new(remitly::RemitlyAdapter::new(context.clone(), base_url.clone()))
        });
    }
    {
        let context = context.clone();
        let base_url = endpoints.get(instarem::PROVIDER_ID);
        registry.register(instarem::PROVIDER_ID, "InstaRem", move || {
            Arc::new(instarem::InstaremAdapter::new(context.clone(), base_url.clone()))
        });
    }
    {
        let base_url = endpoints.get(worldremit::PROVIDER_ID);
        registry.register(worldremit::PROVIDER_ID, "WorldRemit", move || {
            Arc::new(worldremit::WorldRemitAdapter::new(context.clone(), base_url.clone()))
        });
    }
}
