//! Dashboard-side client for `POST /api/collection`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{CollectionSource, CollectionSourceError};
use crate::domain::{NftToken, TRACE_ID_HEADER, TraceId, WalletAddress};
use crate::outbound::http_support::{build_client, join_path, status_message};

const COLLECTION_PATH: &str = "api/collection";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionRequestDto<'a> {
    user_address: &'a str,
}

/// Collection source calling the proxy endpoint over HTTP.
pub struct HttpCollectionSource {
    client: Client,
    endpoint: Url,
}

impl HttpCollectionSource {
    /// Target `{api_base}/api/collection`, keeping any path prefix on the
    /// base URL.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the base URL cannot carry a path or the
    /// reqwest client cannot be constructed.
    pub fn new(api_base: &Url, timeout: Option<Duration>) -> Result<Self, CollectionSourceError> {
        let endpoint = join_path(api_base, COLLECTION_PATH).ok_or_else(|| {
            CollectionSourceError::transport(format!(
                "API base URL `{api_base}` cannot carry a path"
            ))
        })?;
        let client = build_client(timeout)
            .map_err(|error| CollectionSourceError::transport(error.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CollectionSource for HttpCollectionSource {
    async fn fetch_tokens(
        &self,
        owner: &WalletAddress,
    ) -> Result<Vec<NftToken>, CollectionSourceError> {
        let trace_id = TraceId::current();
        debug!(endpoint = %self.endpoint, owner = %owner, trace_id = ?trace_id, "requesting collection");
        let mut request = self.client.post(self.endpoint.clone()).json(&CollectionRequestDto {
            user_address: owner.as_ref(),
        });
        if let Some(id) = trace_id {
            request = request.header(TRACE_ID_HEADER, id.to_string());
        }
        let response = request
            .send()
            .await
            .map_err(|error| CollectionSourceError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| CollectionSourceError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(CollectionSourceError::status(
                status.as_u16(),
                status_message(status, body.as_ref()),
            ));
        }
        parse_tokens(body.as_ref())
    }
}

fn parse_tokens(body: &[u8]) -> Result<Vec<NftToken>, CollectionSourceError> {
    serde_json::from_slice(body).map_err(|error| {
        CollectionSourceError::decode(format!("invalid collection payload: {error}"))
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:8080")]
    #[case("http://localhost:8080/")]
    fn endpoint_is_collection_path(#[case] base: &str) {
        let source =
            HttpCollectionSource::new(&Url::parse(base).expect("url"), None).expect("client");
        assert_eq!(source.endpoint().as_str(), "http://localhost:8080/api/collection");
    }

    #[rstest]
    #[case("http://localhost:8080/proxy", "http://localhost:8080/proxy/api/collection")]
    #[case("https://dash.example/v1/", "https://dash.example/v1/api/collection")]
    fn endpoint_keeps_base_path_prefix(#[case] base: &str, #[case] expected: &str) {
        let source =
            HttpCollectionSource::new(&Url::parse(base).expect("url"), None).expect("client");
        assert_eq!(source.endpoint().as_str(), expected);
    }

    #[test]
    fn opaque_base_url_is_rejected() {
        let base = Url::parse("mailto:ops@example.com").expect("url");
        let result = HttpCollectionSource::new(&base, None);
        assert!(matches!(result, Err(CollectionSourceError::Transport { .. })));
    }

    #[test]
    fn request_body_uses_camel_case() {
        let body = serde_json::to_value(CollectionRequestDto {
            user_address: "0xABC",
        })
        .expect("serialise");
        assert_eq!(body, serde_json::json!({ "userAddress": "0xABC" }));
    }

    #[test]
    fn decodes_proxy_listing() {
        let body = br#"[
            { "token_address": "0xdef", "token_id": "1", "token_uri": "https://m/1", "metadata": null },
            { "token_address": "0xdef", "token_id": 2, "metadata": "{\"name\":\"Two\"}" }
        ]"#;
        let tokens = parse_tokens(body).expect("tokens");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token_id, "2");
        assert!(tokens[1].token_uri.is_none());
    }

    #[test]
    fn error_payload_is_decode_error() {
        let error = parse_tokens(br#"{"error":"Invalid Request Method"}"#).expect_err("not a list");
        assert!(matches!(error, CollectionSourceError::Decode { .. }));
    }
}
