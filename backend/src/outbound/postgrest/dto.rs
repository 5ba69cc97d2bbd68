//! Wire shapes for the hosted gateway.

use serde::{Deserialize, Serialize};

/// Session returned by the anonymous sign-up endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct AnonymousSessionDto {
    pub(super) access_token: String,
}

/// Row as returned by `select=*`.
#[derive(Debug, Deserialize)]
pub(super) struct UserRowDto {
    pub(super) id: i64,
    pub(super) echelon_id: String,
    #[serde(default)]
    pub(super) name: String,
    #[serde(default)]
    pub(super) email: String,
    #[serde(default)]
    pub(super) wallet_address: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct EchelonIdDto {
    pub(super) echelon_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct NewUserDto<'a> {
    pub(super) echelon_id: &'a str,
    pub(super) name: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) wallet_address: &'a str,
}

/// Error body emitted by the gateway, for example on unique violations.
#[derive(Debug, Deserialize)]
pub(super) struct GatewayErrorDto {
    pub(super) message: String,
}
