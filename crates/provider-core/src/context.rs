use std::{sync::Arc, time::Duration};

use catalog::Catalog;

/// Everything an adapter is allowed to depend on (Design Notes §9): the
/// catalog, an HTTP client factory, and a clock. Deliberately excludes the
/// registry and the coordinator so adapters cannot reach back up the call
/// graph.
#[derive(Clone)]
pub struct AdapterContext {
    pub catalog: Catalog,
    client: reqwest::Client,
}

impl AdapterContext {
    pub fn new(catalog: Catalog, connect_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .expect("reqwest client with static TLS config must build");
        Self { catalog, client }
    }

    /// Builds a context around an already-configured client, used by tests
    /// that point adapters at a `wiremock` server.
    pub fn with_client(catalog: Catalog, client: reqwest::Client) -> Self {
        Self { catalog, client }
    }

    /// The shared HTTP client. Adapters must still apply their own
    /// per-request timeout derived from the `Deadline` they are given —
    /// this client has no fixed per-request timeout of its own.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}

pub type SharedContext = Arc<AdapterContext>;
