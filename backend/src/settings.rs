//! Environment configuration for both binaries, loaded via OrthoConfig.
//!
//! Every value is read from `PARALLEL_*` variables. Raw settings keep each
//! field optional; `validate` turns them into typed configuration or reports
//! the first missing or malformed value.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{Chain, CollectionConfigError, ContractAddress};
use crate::outbound::DEFAULT_INDEXER_BASE_URL;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";
const SESSION_DIR_NAME: &str = "parallel-connect";

/// Errors raised while validating settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("PARALLEL_PROJECT_ID is required")]
    MissingProjectId,
    #[error("PARALLEL_DATABASE_URL is required")]
    MissingDatabaseUrl,
    #[error("PARALLEL_ANON_KEY is required when the directory is the REST gateway")]
    MissingAnonKey,
    #[error("PARALLEL_INDEXER_API_KEY is required")]
    MissingIndexerApiKey,
    #[error("PARALLEL_CONTRACT_ADDRESS is required")]
    MissingContractAddress,
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("PARALLEL_DATABASE_URL must use postgres://, http:// or https://, got `{scheme}`")]
    UnsupportedDatabaseScheme { scheme: String },
    #[error("PARALLEL_BIND_ADDR `{value}` is not a socket address")]
    InvalidBindAddr { value: String },
    #[error(transparent)]
    Collection(#[from] CollectionConfigError),
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|source| SettingsError::InvalidUrl { name, source })
}

/// Settings for the collection proxy server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PARALLEL")]
pub struct ServerSettings {
    /// Socket the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// API key for the NFT indexing service.
    pub indexer_api_key: Option<String>,
    /// Indexing API base URL override.
    pub indexer_base_url: Option<String>,
    /// Contract whose tokens the proxy returns.
    pub contract_address: Option<String>,
    /// Chain to query; defaults to Ethereum mainnet.
    pub chain: Option<String>,
    /// Outbound request timeout in seconds; `0` means no timeout.
    #[ortho_config(default = 0)]
    pub request_timeout_secs: u64,
}

/// Validated server configuration.
#[derive(Debug)]
pub struct ServerValues {
    pub bind_addr: SocketAddr,
    pub indexer_api_key: Zeroizing<String>,
    pub indexer_base_url: Url,
    pub contract: ContractAddress,
    pub chain: Chain,
    pub request_timeout: Option<Duration>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> &str {
        non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn indexer_base_url(&self) -> &str {
        non_blank(self.indexer_base_url.as_ref()).unwrap_or(DEFAULT_INDEXER_BASE_URL)
    }

    pub fn chain(&self) -> Result<Chain, CollectionConfigError> {
        non_blank(self.chain.as_ref()).map_or(Ok(Chain::default()), str::parse)
    }

    /// Resolve typed values.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for the first missing or malformed value.
    pub fn validate(&self) -> Result<ServerValues, SettingsError> {
        let bind_addr = self
            .bind_addr()
            .parse()
            .map_err(|_| SettingsError::InvalidBindAddr {
                value: self.bind_addr().to_owned(),
            })?;
        let indexer_api_key = non_blank(self.indexer_api_key.as_ref())
            .ok_or(SettingsError::MissingIndexerApiKey)?;
        let contract = non_blank(self.contract_address.as_ref())
            .ok_or(SettingsError::MissingContractAddress)
            .and_then(|raw| ContractAddress::new(raw).map_err(SettingsError::from))?;
        Ok(ServerValues {
            bind_addr,
            indexer_api_key: Zeroizing::new(indexer_api_key.to_owned()),
            indexer_base_url: parse_url("PARALLEL_INDEXER_BASE_URL", self.indexer_base_url())?,
            contract,
            chain: self.chain()?,
            request_timeout: timeout_from_secs(self.request_timeout_secs),
        })
    }
}

/// Settings for the command-line dashboard.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PARALLEL")]
pub struct ClientSettings {
    /// Wallet-connection project identifier. Required.
    pub project_id: Option<String>,
    /// `postgres://` for direct access, `http(s)://` for the REST gateway.
    pub database_url: Option<String>,
    /// Anonymous key for the REST gateway.
    pub anon_key: Option<String>,
    /// Base URL of the collection proxy server.
    pub api_base_url: Option<String>,
    /// Directory holding the session marker.
    pub session_dir: Option<PathBuf>,
    /// Outbound request timeout in seconds; `0` means no timeout.
    #[ortho_config(default = 0)]
    pub request_timeout_secs: u64,
}

/// Where the user directory lives.
#[derive(Debug)]
pub enum DirectoryTarget {
    Postgres { url: Zeroizing<String> },
    Gateway { url: Url, anon_key: Zeroizing<String> },
}

/// Validated client configuration.
#[derive(Debug)]
pub struct ClientValues {
    pub project_id: String,
    pub directory: DirectoryTarget,
    pub api_base_url: Url,
    pub session_dir: PathBuf,
    pub request_timeout: Option<Duration>,
}

fn default_session_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(std::env::temp_dir)
        .join(SESSION_DIR_NAME)
}

impl ClientSettings {
    pub fn api_base_url(&self) -> &str {
        non_blank(self.api_base_url.as_ref()).unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Session directory, defaulting to `$XDG_RUNTIME_DIR/parallel-connect`
    /// or the temporary directory.
    pub fn session_dir(&self) -> PathBuf {
        self.session_dir.clone().unwrap_or_else(default_session_dir)
    }

    /// Resolve typed values.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingProjectId`] before checking anything
    /// else, then the first missing or malformed directory setting.
    pub fn validate(&self) -> Result<ClientValues, SettingsError> {
        let project_id =
            non_blank(self.project_id.as_ref()).ok_or(SettingsError::MissingProjectId)?;
        Ok(ClientValues {
            project_id: project_id.to_owned(),
            directory: self.directory()?,
            api_base_url: parse_url("PARALLEL_API_BASE_URL", self.api_base_url())?,
            session_dir: self.session_dir(),
            request_timeout: timeout_from_secs(self.request_timeout_secs),
        })
    }

    fn directory(&self) -> Result<DirectoryTarget, SettingsError> {
        let raw =
            non_blank(self.database_url.as_ref()).ok_or(SettingsError::MissingDatabaseUrl)?;
        let url = parse_url("PARALLEL_DATABASE_URL", raw)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(DirectoryTarget::Postgres {
                url: Zeroizing::new(raw.to_owned()),
            }),
            "http" | "https" => {
                let anon_key =
                    non_blank(self.anon_key.as_ref()).ok_or(SettingsError::MissingAnonKey)?;
                Ok(DirectoryTarget::Gateway {
                    url,
                    anon_key: Zeroizing::new(anon_key.to_owned()),
                })
            }
            other => Err(SettingsError::UnsupportedDatabaseScheme {
                scheme: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Environment-driven loading and validation.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const SERVER_VARS: [&str; 6] = [
        "PARALLEL_BIND_ADDR",
        "PARALLEL_INDEXER_API_KEY",
        "PARALLEL_INDEXER_BASE_URL",
        "PARALLEL_CONTRACT_ADDRESS",
        "PARALLEL_CHAIN",
        "PARALLEL_REQUEST_TIMEOUT_SECS",
    ];

    const CLIENT_VARS: [&str; 6] = [
        "PARALLEL_PROJECT_ID",
        "PARALLEL_DATABASE_URL",
        "PARALLEL_ANON_KEY",
        "PARALLEL_API_BASE_URL",
        "PARALLEL_SESSION_DIR",
        "PARALLEL_REQUEST_TIMEOUT_SECS",
    ];

    fn env_with<'a>(
        names: &[&'a str],
        set: &[(&'a str, &str)],
    ) -> Vec<(&'a str, Option<String>)> {
        names
            .iter()
            .map(|name| {
                let value = set
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load_server() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("parallel-connect")])
            .expect("config should load")
    }

    fn load_client() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("dashboard")]).expect("config should load")
    }

    #[rstest]
    fn server_defaults_apply_when_optional_values_missing() {
        let _guard = lock_env(env_with(
            &SERVER_VARS,
            &[
                ("PARALLEL_INDEXER_API_KEY", "key"),
                ("PARALLEL_CONTRACT_ADDRESS", "0xDEF"),
            ],
        ));

        let values = load_server().validate().expect("valid settings");
        assert_eq!(values.bind_addr, DEFAULT_BIND_ADDR.parse().expect("addr"));
        assert_eq!(values.indexer_base_url.as_str(), DEFAULT_INDEXER_BASE_URL);
        assert_eq!(values.contract.as_ref(), "0xdef");
        assert_eq!(values.chain, Chain::Ethereum);
        assert!(values.request_timeout.is_none());
    }

    #[rstest]
    fn server_overrides_are_respected() {
        let _guard = lock_env(env_with(
            &SERVER_VARS,
            &[
                ("PARALLEL_BIND_ADDR", "127.0.0.1:9000"),
                ("PARALLEL_INDEXER_API_KEY", "key"),
                ("PARALLEL_INDEXER_BASE_URL", "http://localhost:9100/api/"),
                ("PARALLEL_CONTRACT_ADDRESS", "0xabc"),
                ("PARALLEL_CHAIN", "sepolia"),
                ("PARALLEL_REQUEST_TIMEOUT_SECS", "15"),
            ],
        ));

        let values = load_server().validate().expect("valid settings");
        assert_eq!(values.bind_addr.port(), 9000);
        assert_eq!(values.chain, Chain::Sepolia);
        assert_eq!(values.request_timeout, Some(Duration::from_secs(15)));
    }

    #[rstest]
    #[case(&[("PARALLEL_CONTRACT_ADDRESS", "0xdef")], "INDEXER_API_KEY")]
    #[case(&[("PARALLEL_INDEXER_API_KEY", "key")], "CONTRACT_ADDRESS")]
    #[case(
        &[("PARALLEL_INDEXER_API_KEY", "key"), ("PARALLEL_CONTRACT_ADDRESS", "nope")],
        "contract address"
    )]
    #[case(
        &[
            ("PARALLEL_INDEXER_API_KEY", "key"),
            ("PARALLEL_CONTRACT_ADDRESS", "0xdef"),
            ("PARALLEL_CHAIN", "dogechain"),
        ],
        "unsupported chain"
    )]
    fn server_rejects_missing_or_malformed_values(
        #[case] set: &[(&'static str, &'static str)],
        #[case] expected: &str,
    ) {
        let _guard = lock_env(env_with(&SERVER_VARS, set));
        let error = load_server().validate().expect_err("invalid settings");
        assert!(error.to_string().contains(expected), "{error}");
    }

    #[rstest]
    #[case("0", None)]
    #[case("30", Some(Duration::from_secs(30)))]
    fn zero_timeout_disables_the_limit(#[case] raw: &str, #[case] expected: Option<Duration>) {
        let _guard = lock_env(env_with(
            &SERVER_VARS,
            &[
                ("PARALLEL_INDEXER_API_KEY", "key"),
                ("PARALLEL_CONTRACT_ADDRESS", "0xDEF"),
                ("PARALLEL_REQUEST_TIMEOUT_SECS", raw),
            ],
        ));
        let values = load_server().validate().expect("valid settings");
        assert_eq!(values.request_timeout, expected);
    }

    #[rstest]
    fn empty_server_environment_reports_missing_api_key() {
        let _guard = lock_env(env_with(&SERVER_VARS, &[]));
        let settings = load_server();
        assert_eq!(settings.request_timeout_secs, 0);
        let error = settings.validate().expect_err("missing api key");
        assert!(matches!(error, SettingsError::MissingIndexerApiKey));
    }

    #[rstest]
    fn client_requires_project_id_first() {
        let _guard = lock_env(env_with(&CLIENT_VARS, &[]));
        let settings = load_client();
        assert_eq!(settings.request_timeout_secs, 0);
        let error = settings.validate().expect_err("missing project id");
        assert!(matches!(error, SettingsError::MissingProjectId));
    }

    #[rstest]
    fn client_selects_postgres_directory() {
        let _guard = lock_env(env_with(
            &CLIENT_VARS,
            &[
                ("PARALLEL_PROJECT_ID", "project"),
                ("PARALLEL_DATABASE_URL", "postgres://localhost/parallel"),
                ("PARALLEL_SESSION_DIR", "/tmp/parallel-session"),
            ],
        ));

        let values = load_client().validate().expect("valid settings");
        assert!(matches!(values.directory, DirectoryTarget::Postgres { .. }));
        assert_eq!(values.api_base_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(values.session_dir, PathBuf::from("/tmp/parallel-session"));
    }

    #[rstest]
    fn gateway_directory_needs_anon_key() {
        let _guard = lock_env(env_with(
            &CLIENT_VARS,
            &[
                ("PARALLEL_PROJECT_ID", "project"),
                ("PARALLEL_DATABASE_URL", "https://project.example.co"),
            ],
        ));
        let error = load_client().validate().expect_err("missing anon key");
        assert!(matches!(error, SettingsError::MissingAnonKey));
    }

    #[rstest]
    fn gateway_directory_with_anon_key() {
        let _guard = lock_env(env_with(
            &CLIENT_VARS,
            &[
                ("PARALLEL_PROJECT_ID", "project"),
                ("PARALLEL_DATABASE_URL", "https://project.example.co"),
                ("PARALLEL_ANON_KEY", "anon"),
            ],
        ));
        let values = load_client().validate().expect("valid settings");
        match values.directory {
            DirectoryTarget::Gateway { url, anon_key } => {
                assert_eq!(url.host_str(), Some("project.example.co"));
                assert_eq!(anon_key.as_str(), "anon");
            }
            DirectoryTarget::Postgres { .. } => panic!("expected gateway directory"),
        }
    }

    #[rstest]
    fn unknown_database_scheme_is_rejected() {
        let _guard = lock_env(env_with(
            &CLIENT_VARS,
            &[
                ("PARALLEL_PROJECT_ID", "project"),
                ("PARALLEL_DATABASE_URL", "mysql://localhost/parallel"),
            ],
        ));
        let error = load_client().validate().expect_err("unsupported scheme");
        assert!(matches!(
            error,
            SettingsError::UnsupportedDatabaseScheme { ref scheme } if scheme == "mysql"
        ));
    }
}
