//! Command-line dashboard: sign in, register and browse the NFT gallery.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, bail};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use parallel_connect::domain::ports::{
    Notice, NoticeLevel, Notifier, SessionStorage, UserDirectory,
};
use parallel_connect::domain::{
    AcquisitionOutcome, AppStore, AssetAcquisition, DashboardMount, IdentityService, Nft,
    RegistrationInput, RegistrationOutcome, SignInOutcome, TraceId, WalletAddress,
    WalletSignInOutcome,
};
use parallel_connect::outbound::{
    DbPool, DieselUserDirectory, FileSessionStorage, HttpCollectionSource, HttpMetadataSource,
    PoolConfig, PostgrestUserDirectory,
};
use parallel_connect::settings::{ClientSettings, ClientValues, DirectoryTarget};

/// `dashboard` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "dashboard",
    about = "ParallelConnect dashboard: identity and NFT gallery",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with an Echelon ID or email and a password.
    SignIn {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with a connected wallet.
    SignInWallet {
        #[arg(long, value_parser = parse_wallet)]
        wallet: WalletAddress,
    },
    /// Register a new user bound to a wallet.
    Register(RegisterArgs),
    /// Report whether a wallet is already registered.
    CheckWallet {
        #[arg(long, value_parser = parse_wallet)]
        wallet: WalletAddress,
    },
    /// Resume the session and print the gallery.
    Dashboard {
        /// Wallet to load; defaults to the signed-in user's wallet.
        #[arg(long, value_parser = parse_wallet)]
        wallet: Option<WalletAddress>,
        /// Show every card's attributes and image.
        #[arg(long)]
        reveal: bool,
    },
    /// Clear the session.
    SignOut,
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long, value_parser = parse_wallet)]
    wallet: WalletAddress,
    #[arg(long, default_value = "")]
    echelon_id: String,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    password: String,
}

fn parse_wallet(raw: &str) -> Result<WalletAddress, String> {
    WalletAddress::new(raw).map_err(|error| error.to_string())
}

/// Prints notices to stderr, the CLI analogue of toasts.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => eprintln!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("dashboard")])
        .wrap_err("failed to load client settings")?;
    let values = settings.validate().wrap_err("invalid client settings")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(TraceId::ensure_scope(async_main(args.command, values)))
}

async fn async_main(command: Command, values: ClientValues) -> color_eyre::Result<()> {
    let trace_id = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
    info!(project_id = %values.project_id, %trace_id, "dashboard starting");
    match &values.directory {
        DirectoryTarget::Postgres { url } => {
            let pool = DbPool::new(PoolConfig::new(url.as_str()))
                .wrap_err("create database pool")?;
            run(command, &values, DieselUserDirectory::new(pool)).await
        }
        DirectoryTarget::Gateway { url, anon_key } => {
            let directory =
                PostgrestUserDirectory::new(url.clone(), anon_key.as_str(), values.request_timeout)
                    .wrap_err("create gateway client")?;
            run(command, &values, directory).await
        }
    }
}

async fn run<D>(command: Command, values: &ClientValues, directory: D) -> color_eyre::Result<()>
where
    D: UserDirectory + 'static,
{
    let store = Arc::new(AppStore::new());
    let notifier = Arc::new(ConsoleNotifier);
    let sessions = Arc::new(
        FileSessionStorage::open(&values.session_dir).wrap_err("open session directory")?,
    );
    let identity = IdentityService::new(
        Arc::new(directory),
        sessions,
        Arc::clone(&notifier),
        Arc::clone(&store),
    );

    match command {
        Command::SignIn {
            identifier,
            password,
        } => match identity.sign_in(&identifier, &password).await? {
            SignInOutcome::SignedIn {
                echelon_id,
                navigate_to,
            } => println!("signed in as {echelon_id}; continue at {}", navigate_to.path()),
            outcome if outcome.needs_sign_up() => {
                println!("no account found; register with `dashboard register`");
            }
            _ => bail!("sign-in rejected"),
        },
        Command::SignInWallet { wallet } => {
            store.connect_wallet(wallet.clone());
            match identity.sign_in_with_wallet(&wallet).await? {
                WalletSignInOutcome::SignedIn {
                    echelon_id,
                    navigate_to,
                } => println!("signed in as {echelon_id}; continue at {}", navigate_to.path()),
                WalletSignInOutcome::WalletNotFound => bail!("wallet {wallet} is not registered"),
            }
        }
        Command::Register(args) => {
            store.connect_wallet(args.wallet);
            let input = RegistrationInput {
                echelon_id: args.echelon_id,
                name: args.name,
                email: args.email,
                password: args.password,
            };
            match identity.register(input).await? {
                RegistrationOutcome::Registered {
                    echelon_id,
                    navigate_to,
                } => println!("registered {echelon_id}; continue at {}", navigate_to.path()),
                RegistrationOutcome::Rejected(failures) => {
                    for failure in &failures {
                        eprintln!("{failure}");
                    }
                    bail!("registration rejected");
                }
                RegistrationOutcome::WalletNotConnected
                | RegistrationOutcome::WalletAlreadyRegistered => bail!("registration refused"),
            }
        }
        Command::CheckWallet { wallet } => {
            if identity.wallet_registered(&wallet).await {
                println!("{wallet} is registered; sign in instead");
            } else {
                println!("{wallet} is available");
            }
        }
        Command::Dashboard { wallet, reveal } => {
            show_dashboard(&identity, values, wallet, reveal).await?;
        }
        Command::SignOut => {
            let route = identity.sign_out()?;
            println!("signed out; continue at {}", route.path());
        }
    }
    Ok(())
}

async fn show_dashboard<D, S, N>(
    identity: &IdentityService<D, S, N>,
    values: &ClientValues,
    wallet: Option<WalletAddress>,
    reveal: bool,
) -> color_eyre::Result<()>
where
    D: UserDirectory,
    S: SessionStorage,
    N: Notifier + 'static,
{
    let user = match identity.resume_session().await? {
        DashboardMount::Redirect(route) => {
            println!("not signed in; continue at {}", route.path());
            return Ok(());
        }
        DashboardMount::Ready { user } => user,
    };
    let store = identity.store();
    match &user {
        Some(user) => println!("{} <{}> ({})", user.name(), user.email(), user.echelon_id()),
        None => println!("signed in, profile unavailable"),
    }

    let owner = wallet.or_else(|| {
        user.as_ref()
            .and_then(|user| WalletAddress::new(user.wallet_address()).ok())
    });
    let Some(owner) = owner else {
        println!("connect a wallet with --wallet to load the gallery");
        return Ok(());
    };
    store.connect_wallet(owner.clone());
    store.set_reveal_cards(reveal);

    let acquisition = AssetAcquisition::new(
        Arc::new(
            HttpCollectionSource::new(&values.api_base_url, values.request_timeout)
                .wrap_err("create collection client")?,
        ),
        Arc::new(HttpMetadataSource::new(values.request_timeout).wrap_err("create metadata client")?),
        Arc::new(ConsoleNotifier),
        Arc::clone(store),
    );
    if let AcquisitionOutcome::Failed(error) = acquisition.acquire(&owner).await {
        bail!("gallery unavailable: {error}");
    }

    let snapshot = store.snapshot();
    if snapshot.nfts.is_empty() {
        println!("no cards in this collection for {owner}");
    }
    for nft in &snapshot.nfts {
        print_card(nft, snapshot.reveal_cards);
    }
    Ok(())
}

fn print_card(nft: &Nft, reveal: bool) {
    println!("#{} {}", nft.token_id, nft.name);
    if !reveal {
        return;
    }
    if !nft.description.is_empty() {
        println!("  {}", nft.description);
    }
    for attribute in &nft.attributes {
        let label = if attribute.trait_type.is_empty() {
            &attribute.key
        } else {
            &attribute.trait_type
        };
        println!("  {label}: {}", attribute.value);
    }
    if !nft.image.is_empty() {
        println!("  image: {}", nft.image);
    }
}
