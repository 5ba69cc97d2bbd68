//! Collection proxy entry-point: wires the indexer adapter, health probes and
//! OpenAPI docs.

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use parallel_connect::domain::CollectionService;
use parallel_connect::inbound::http::health::HealthState;
use parallel_connect::outbound::MoralisIndexer;
use parallel_connect::settings::ServerSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter([OsString::from("parallel-connect")])
        .wrap_err("failed to load server settings")?;
    let values = settings.validate().wrap_err("invalid server settings")?;
    info!(
        contract = %values.contract,
        chain = %values.chain,
        indexer = %values.indexer_base_url,
        "configuring collection proxy"
    );

    let indexer = MoralisIndexer::new(
        values.indexer_base_url,
        values.indexer_api_key.as_str(),
        values.request_timeout,
    );
    let collection = CollectionService::new(Arc::new(indexer), values.contract, values.chain);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig::new(values.bind_addr, Arc::new(collection)),
    )?;
    server.await?;
    Ok(())
}
