//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use parallel_connect::Trace;
#[cfg(debug_assertions)]
use parallel_connect::doc::ApiDoc;
use parallel_connect::inbound::http::collection;
use parallel_connect::inbound::http::health::{HealthState, live, ready};
use parallel_connect::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(collection::configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Readiness is marked once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        collection,
    } = config;
    let http_state = web::Data::new(HttpState::new(collection));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "collection proxy listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Application wiring checks against the assembled app.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use async_trait::async_trait;
    use parallel_connect::domain::ports::CollectionQuery;
    use parallel_connect::domain::{Error, IndexedNft, WalletAddress};

    use super::*;

    struct EmptyCollection;

    #[async_trait]
    impl CollectionQuery for EmptyCollection {
        async fn owned_in_collection(
            &self,
            _owner: &WalletAddress,
        ) -> Result<Vec<IndexedNft>, Error> {
            Ok(Vec::new())
        }
    }

    fn deps() -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(HttpState::new(Arc::new(EmptyCollection))),
        }
    }

    #[actix_web::test]
    async fn probes_and_proxy_are_mounted() {
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        let app = actix_test::init_service(build_app(AppDependencies {
            health_state: health,
            ..deps()
        }))
        .await;

        let readiness = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(readiness.status(), StatusCode::OK);

        let wrong_method = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/collection").to_request(),
        )
        .await;
        assert_eq!(wrong_method.status(), StatusCode::BAD_REQUEST);
        assert!(wrong_method.headers().contains_key("trace-id"));

        let listing = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/collection")
                .set_json(serde_json::json!({ "userAddress": "0xABC" }))
                .to_request(),
        )
        .await;
        assert_eq!(listing.status(), StatusCode::OK);
    }
}
