//! Process-wide observable application state.
//!
//! [`AppStore`] is the single writer for the connected wallet, the current
//! user, the NFT gallery, the reveal toggle, the loading flag and the session
//! phase. Presentation code reads it through [`AppStore::subscribe`]. Setters
//! are independent; related updates are not grouped.

use tokio::sync::watch;

use super::{CurrentUser, Nft, WalletAddress};

/// Coarse authentication state exposed to presentation code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Wallet connection as reported by the wallet layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WalletConnection {
    #[default]
    Disconnected,
    Connected(WalletAddress),
}

impl WalletConnection {
    pub fn address(&self) -> Option<&WalletAddress> {
        match self {
            Self::Connected(address) => Some(address),
            Self::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

/// Point-in-time copy of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSnapshot {
    pub wallet: WalletConnection,
    pub current_user: Option<CurrentUser>,
    pub nfts: Vec<Nft>,
    pub reveal_cards: bool,
    pub loading_nfts: bool,
    pub phase: SessionPhase,
}

/// Shared observable state container.
///
/// # Examples
/// ```
/// use parallel_connect::domain::{AppStore, WalletAddress};
///
/// let store = AppStore::new();
/// let mut rx = store.subscribe();
/// store.connect_wallet(WalletAddress::new("0xabc").unwrap());
/// assert!(rx.has_changed().unwrap());
/// assert!(rx.borrow_and_update().wallet.is_connected());
/// ```
#[derive(Debug)]
pub struct AppStore {
    state: watch::Sender<AppSnapshot>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    /// Create a store holding the default (signed-out, disconnected) state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(AppSnapshot::default());
        Self { state }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AppSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified after every effective change.
    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.state.subscribe()
    }

    /// Currently connected wallet address, if any.
    pub fn wallet_address(&self) -> Option<WalletAddress> {
        self.state.borrow().wallet.address().cloned()
    }

    /// Replace the wallet connection. Subscribers are only woken on change.
    pub fn set_wallet(&self, wallet: WalletConnection) {
        self.state.send_if_modified(|state| {
            if state.wallet == wallet {
                return false;
            }
            state.wallet = wallet;
            true
        });
    }

    pub fn connect_wallet(&self, address: WalletAddress) {
        self.set_wallet(WalletConnection::Connected(address));
    }

    pub fn disconnect_wallet(&self) {
        self.set_wallet(WalletConnection::Disconnected);
    }

    pub fn set_current_user(&self, user: Option<CurrentUser>) {
        self.state.send_modify(|state| state.current_user = user);
    }

    /// Replace the gallery wholesale.
    pub fn set_nft_list(&self, nfts: Vec<Nft>) {
        self.state.send_modify(|state| state.nfts = nfts);
    }

    pub fn set_reveal_cards(&self, reveal: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.reveal_cards != reveal;
            state.reveal_cards = reveal;
            changed
        });
    }

    pub fn set_loading_nfts(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading_nfts != loading;
            state.loading_nfts = loading;
            changed
        });
    }

    pub fn set_phase(&self, phase: SessionPhase) {
        self.state.send_if_modified(|state| {
            let changed = state.phase != phase;
            state.phase = phase;
            changed
        });
    }
}
