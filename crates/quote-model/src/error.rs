use serde::{Deserialize, Serialize};

/// The canonical failure taxonomy (spec §6/§7). Every adapter and
/// normalizer failure is mapped onto one of these before it leaves the
/// provider boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "PascalCase")]
pub enum ErrorKind {
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("corridor not supported by provider")]
    UnsupportedCorridor,
    #[error("authentication failed")]
    Authentication,
    #[error("connection error")]
    Connection,
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by provider")]
    RateLimit,
    #[error("provider api error")]
    ProviderApi,
    #[error("failed to parse provider response")]
    Parsing,
    #[error("provider response internally inconsistent")]
    InconsistentResponse,
    #[error("internal error")]
    Internal,
}

impl ErrorKind {
    /// Whether the adapter contract (§4.B rule 3) permits a single bounded
    /// retry for this kind of failure.
    pub fn retryable(self) -> bool {
        matches!(self, Self::Connection | Self::RateLimit | Self::Authentication)
    }
}
