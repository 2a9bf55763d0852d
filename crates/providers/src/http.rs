//! Shared HTTP helper for provider adapters, grounded on
//! `autopilot::infra::solvers::Driver::request_response`: a thin wrapper
//! around `reqwest::Client` that applies the adapter's remaining deadline as
//! the request timeout, logs request/response bodies at `trace`, and maps
//! every failure mode onto the typed `RawError` taxonomy instead of letting
//! a raw `reqwest::Error` escape the adapter boundary.

use std::fmt::Debug;

use provider_core::{Deadline, RawError};
use quote_model::ErrorKind;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// Response bodies above this size are rejected rather than buffered
/// (mirrors `RESPONSE_SIZE_LIMIT` in the teacher's solver `Driver`).
const RESPONSE_SIZE_LIMIT: usize = 2_000_000;

pub struct AdapterHttp<'a> {
    client: &'a Client,
    base_url: &'a Url,
    provider_id: &'static str,
}

impl<'a> AdapterHttp<'a> {
    pub fn new(client: &'a Client, base_url: &'a Url, provider_id: &'static str) -> Self {
        Self {
            client,
            base_url,
            provider_id,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        deadline: Deadline,
    ) -> Result<T, RawError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| self.internal(format!("bad adapter URL {path}: {e}")))?;
        let request = self.client.get(url).query(query);
        self.send(request, deadline).await
    }

    pub async fn post_json<B: Serialize + Debug, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        deadline: Deadline,
    ) -> Result<T, RawError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| self.internal(format!("bad adapter URL {path}: {e}")))?;
        let request = self.client.post(url).json(body);
        tracing::trace!(provider = self.provider_id, ?body, "provider request");
        self.send(request, deadline).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        deadline: Deadline,
    ) -> Result<T, RawError> {
        let remaining = deadline.remaining();
        if remaining.is_zero() {
            return Err(RawError::new(ErrorKind::Timeout, "deadline already passed"));
        }
        let mut response = request
            .timeout(remaining)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        let body = body_with_size_limit(&mut response, RESPONSE_SIZE_LIMIT)
            .await
            .map_err(|_| {
                RawError::new(
                    ErrorKind::Parsing,
                    format!("{}: response exceeded size limit", self.provider_id),
                )
            })?;
        let text = String::from_utf8_lossy(&body);
        tracing::trace!(provider = self.provider_id, %status, body = %text, "provider response");

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RawError::new(
                ErrorKind::Authentication,
                format!("{}: HTTP {status}", self.provider_id),
            ));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RawError::new(
                ErrorKind::RateLimit,
                format!("{}: HTTP {status}", self.provider_id),
            ));
        }
        if !status.is_success() {
            return Err(RawError::new(
                ErrorKind::ProviderApi,
                format!("{}: HTTP {status}: {text}", self.provider_id),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| {
            RawError::new(
                ErrorKind::Parsing,
                format!("{}: {e} (body {text:?})", self.provider_id),
            )
        })
    }

    fn classify_transport_error(&self, error: reqwest::Error) -> RawError {
        let kind = if error.is_timeout() {
            ErrorKind::Timeout
        } else if error.is_connect() {
            ErrorKind::Connection
        } else {
            ErrorKind::Internal
        };
        RawError::new(kind, format!("{}: {error}", self.provider_id))
    }

    fn internal(&self, message: String) -> RawError {
        RawError::new(ErrorKind::Internal, message)
    }
}

async fn body_with_size_limit(
    response: &mut reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ()> {
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|_| ())? {
        if bytes.len() + chunk.len() > limit {
            return Err(());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Locale-neutral decimal parsing (spec §4.B rule 4): strips thousands
/// separators (`,`) before parsing, since the decimal point is always `.`.
pub fn parse_locale_decimal(raw: &str) -> Result<rust_decimal::Decimal, RawError> {
    let cleaned = raw.trim().replace(',', "");
    cleaned
        .parse()
        .map_err(|_| RawError::new(ErrorKind::Parsing, format!("not a decimal: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(parse_locale_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_locale_decimal("1000").unwrap(), dec!(1000));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_locale_decimal("not-a-number").is_err());
    }
}
