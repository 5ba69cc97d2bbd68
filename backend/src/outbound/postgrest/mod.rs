//! User directory adapter for the hosted REST gateway.
//!
//! The gateway fronts `parallel_users` with PostgREST filter syntax. Every
//! session starts with an anonymous sign-up whose access token is then sent
//! as the bearer credential; until then the anon key is used.

mod dto;
mod filters;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::RwLock;
use tracing::debug;
use zeroize::Zeroizing;

use self::dto::{
    AnonymousSessionDto, EchelonIdDto, GatewayErrorDto, NewUserDto, UserRowDto,
};
use self::filters::{TABLE_PATH, credentials_match, eq_value, identifier_match};
use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{
    CurrentUser, EchelonId, EmailAddress, NewUserRecord, SignInCredentials, WalletAddress,
};
use crate::outbound::http_support::{body_preview, build_client, join_path, status_message};

const API_KEY_HEADER: &str = "apikey";
const SIGNUP_PATH: &str = "auth/v1/signup";

/// Directory speaking to a PostgREST gateway over HTTP.
pub struct PostgrestUserDirectory {
    client: Client,
    base_url: Url,
    anon_key: Zeroizing<String>,
    access_token: RwLock<Option<Zeroizing<String>>>,
}

impl PostgrestUserDirectory {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        anon_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
            anon_key: Zeroizing::new(anon_key.into()),
            access_token: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, UserDirectoryError> {
        join_path(&self.base_url, path).ok_or_else(|| {
            UserDirectoryError::connection(format!(
                "gateway URL `{}` cannot carry a path",
                self.base_url
            ))
        })
    }

    fn table_url(&self, filters: &[(&str, String)], select: &str) -> Result<Url, UserDirectoryError> {
        let mut url = self.endpoint(TABLE_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", select);
            for (key, value) in filters {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.access_token.read().await;
        let bearer = token.as_deref().map_or(self.anon_key.as_str(), String::as_str);
        request
            .header(API_KEY_HEADER, self.anon_key.as_str())
            .bearer_auth(bearer)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        filters: &[(&str, String)],
        select: &str,
    ) -> Result<Vec<T>, UserDirectoryError> {
        let url = self.table_url(filters, select)?;
        debug!(path = url.path(), "querying user directory");
        let request = self.authorised(self.client.get(url)).await;
        let body = send(request).await?;
        serde_json::from_slice(&body)
            .map_err(|error| UserDirectoryError::query(format!("invalid directory rows: {error}")))
    }

    async fn echelon_ids(
        &self,
        filters: &[(&str, String)],
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        let rows: Vec<EchelonIdDto> = self.select(filters, "echelon_id").await?;
        rows.into_iter()
            .map(|row| parse_echelon_id(&row.echelon_id))
            .collect()
    }

    async fn any(&self, filters: &[(&str, String)]) -> Result<bool, UserDirectoryError> {
        let mut filters = filters.to_vec();
        filters.push(("limit", "1".to_owned()));
        let rows: Vec<IgnoredAny> = self.select(&filters, "id").await?;
        Ok(!rows.is_empty())
    }
}

async fn send(request: RequestBuilder) -> Result<Vec<u8>, UserDirectoryError> {
    let response = request
        .send()
        .await
        .map_err(|error| UserDirectoryError::connection(error.to_string()))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|error| UserDirectoryError::connection(error.to_string()))?;
    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(map_status(status, &body))
    }
}

fn map_status(status: StatusCode, body: &[u8]) -> UserDirectoryError {
    let gateway_message = serde_json::from_slice::<GatewayErrorDto>(body)
        .map(|dto| dto.message)
        .unwrap_or_else(|_| body_preview(body));
    match status {
        StatusCode::CONFLICT => UserDirectoryError::rejected(gateway_message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            UserDirectoryError::connection(status_message(status, body))
        }
        status if status.is_server_error() => {
            UserDirectoryError::connection(status_message(status, body))
        }
        _ => UserDirectoryError::query(status_message(status, body)),
    }
}

fn parse_echelon_id(value: &str) -> Result<EchelonId, UserDirectoryError> {
    EchelonId::new(value)
        .map_err(|error| UserDirectoryError::query(format!("stored row is invalid: {error}")))
}

fn row_to_user(row: UserRowDto) -> Result<CurrentUser, UserDirectoryError> {
    let echelon_id = parse_echelon_id(&row.echelon_id)?;
    Ok(CurrentUser::new(
        row.id,
        row.name,
        row.email,
        echelon_id,
        row.wallet_address,
    ))
}

#[async_trait]
impl UserDirectory for PostgrestUserDirectory {
    async fn sign_in_anonymously(&self) -> Result<(), UserDirectoryError> {
        let url = self.endpoint(SIGNUP_PATH)?;
        let request = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.anon_key.as_str())
            .json(&serde_json::json!({}));
        let body = send(request).await?;
        let session: AnonymousSessionDto = serde_json::from_slice(&body).map_err(|error| {
            UserDirectoryError::connection(format!("invalid anonymous session: {error}"))
        })?;
        *self.access_token.write().await = Some(Zeroizing::new(session.access_token));
        debug!("anonymous directory session established");
        Ok(())
    }

    async fn find_by_echelon_id(
        &self,
        echelon_id: &EchelonId,
    ) -> Result<Vec<CurrentUser>, UserDirectoryError> {
        let rows: Vec<UserRowDto> = self
            .select(&[("echelon_id", eq_value(echelon_id.as_ref()))], "*")
            .await?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        self.echelon_ids(&[("or", identifier_match(identifier))])
            .await
    }

    async fn find_by_credentials(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        self.echelon_ids(&[(
            "or",
            credentials_match(credentials.identifier(), credentials.password()),
        )])
        .await
    }

    async fn find_by_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        self.echelon_ids(&[("wallet_address", eq_value(wallet.as_ref()))])
            .await
    }

    async fn echelon_id_exists(&self, echelon_id: &EchelonId) -> Result<bool, UserDirectoryError> {
        self.any(&[("echelon_id", eq_value(echelon_id.as_ref()))])
            .await
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserDirectoryError> {
        self.any(&[("email", eq_value(email.as_ref()))]).await
    }

    async fn wallet_exists(&self, wallet: &WalletAddress) -> Result<bool, UserDirectoryError> {
        self.any(&[("wallet_address", eq_value(wallet.as_ref()))])
            .await
    }

    async fn insert(&self, record: &NewUserRecord) -> Result<(), UserDirectoryError> {
        let url = self.endpoint(TABLE_PATH)?;
        let body = NewUserDto {
            echelon_id: record.echelon_id().as_ref(),
            name: record.name(),
            email: record.email().as_ref(),
            password: record.password(),
            wallet_address: record.wallet_address().as_ref(),
        };
        let request = self
            .authorised(self.client.post(url))
            .await
            .header("Prefer", "return=minimal")
            .json(&body);
        send(request).await.map(drop)
    }
}
