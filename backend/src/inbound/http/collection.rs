//! `POST /api/collection`: a wallet's NFTs within the configured collection.
//!
//! Only `POST` is accepted. Every other method receives
//! `400 {"error": "Invalid Request Method"}`.

use actix_web::{HttpRequest, HttpResponse, error::JsonPayloadError, web};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{Error, IndexedNft, WalletAddress};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Route path served by this module.
pub const COLLECTION_PATH: &str = "/api/collection";

const INVALID_METHOD: &str = "Invalid Request Method";

/// Request body for the collection lookup.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    /// Wallet whose holdings are listed.
    #[schema(example = "0xABC")]
    pub user_address: String,
}

/// Body returned for unsupported methods.
#[derive(Debug, ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct InvalidMethodBody {
    #[schema(example = "Invalid Request Method")]
    error: String,
}

/// Register the collection resource.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(COLLECTION_PATH)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route(web::post().to(list_collection))
            .default_service(web::to(invalid_method)),
    );
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected collection payload");
    Error::invalid_request("request body must be JSON with a userAddress field")
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

/// List the caller's NFTs minted by the configured contract.
#[utoipa::path(
    post,
    path = "/api/collection",
    tags = ["collection"],
    request_body = CollectionRequest,
    responses(
        (status = 200, description = "Owned NFTs in the collection", body = [crate::inbound::http::schemas::IndexedNftSchema]),
        (status = 400, description = "Invalid payload or method", body = InvalidMethodBody),
        (status = 503, description = "Indexer unavailable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    security([])
)]
pub async fn list_collection(
    state: web::Data<HttpState>,
    payload: web::Json<CollectionRequest>,
) -> ApiResult<web::Json<Vec<IndexedNft>>> {
    let owner = WalletAddress::new(&payload.user_address).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "userAddress" }))
    })?;
    let owned = state.collection.owned_in_collection(&owner).await?;
    Ok(web::Json(owned))
}

async fn invalid_method() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": INVALID_METHOD }))
}
