//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the collection proxy and the health probes together
//! with the schema wrappers from [`crate::inbound::http::schemas`]. Swagger UI
//! serves it in debug builds and `openapi-dump` prints it for tooling.

use crate::inbound::http::collection::{CollectionRequest, InvalidMethodBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, IndexedNftSchema};
use utoipa::OpenApi;

/// OpenAPI document for the HTTP API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ParallelConnect API",
        description = "Collection proxy for the ParallelConnect dashboard and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::collection::list_collection,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CollectionRequest,
        InvalidMethodBody,
        IndexedNftSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "collection", description = "NFTs held by a wallet within the configured collection"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Document structure checks.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const INDEXED_NFT_SCHEMA_NAME: &str = "crate.domain.IndexedNft";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, "code")]
    #[case(ERROR_SCHEMA_NAME, "traceId")]
    #[case(INDEXED_NFT_SCHEMA_NAME, "token_address")]
    #[case("CollectionRequest", "userAddress")]
    fn schema_has_field(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/collection")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn path_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn collection_is_post_only() {
        let doc = ApiDoc::openapi();
        let item = doc.paths.paths.get("/api/collection").expect("collection path");
        assert!(item.post.is_some());
        assert!(item.get.is_none());
    }
}
