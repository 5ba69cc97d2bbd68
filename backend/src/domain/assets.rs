//! Asset acquisition: wallet address to displayable NFT gallery.
//!
//! One proxy call lists the wallet's tokens, then every metadata document is
//! fetched at once. The batch is all-or-nothing: the first failure aborts it
//! and the gallery keeps its previous contents. Each run takes a generation
//! number and only the newest run may touch the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CollectionSource, CollectionSourceError, MetadataSource, MetadataSourceError, Notice, Notifier,
};
use crate::domain::{AppStore, Nft, NftToken, TraceId, WalletAddress};

/// Why an acquisition batch failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    #[error(transparent)]
    Collection(#[from] CollectionSourceError),
    #[error(transparent)]
    Metadata(#[from] MetadataSourceError),
}

/// Outcome of a single acquisition run.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionOutcome {
    /// The gallery was replaced with this many assets.
    Loaded(usize),
    /// A newer run started before this one settled; its result was dropped.
    Superseded,
    /// The batch failed and the gallery was left unchanged.
    Failed(AcquisitionError),
}

/// Asset acquisition pipeline bound to the shared store.
pub struct AssetAcquisition<C, M, N> {
    collection: Arc<C>,
    metadata: Arc<M>,
    notifier: Arc<N>,
    store: Arc<AppStore>,
    generation: AtomicU64,
}

impl<C, M, N> AssetAcquisition<C, M, N> {
    pub fn new(collection: Arc<C>, metadata: Arc<M>, notifier: Arc<N>, store: Arc<AppStore>) -> Self {
        Self {
            collection,
            metadata,
            notifier,
            store,
            generation: AtomicU64::new(0),
        }
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Supersede any in-flight run without starting a new one.
    pub fn invalidate(&self) {
        self.begin();
        self.store.set_loading_nfts(false);
    }
}

impl<C, M, N> AssetAcquisition<C, M, N>
where
    C: CollectionSource,
    M: MetadataSource,
    N: Notifier,
{
    /// Fetch the gallery for `owner` and publish it if this run is still the
    /// newest when it settles.
    pub async fn acquire(&self, owner: &WalletAddress) -> AcquisitionOutcome {
        let generation = self.start();
        self.settle(generation, owner).await
    }

    fn start(&self) -> u64 {
        let generation = self.begin();
        self.store.set_loading_nfts(true);
        generation
    }

    async fn settle(&self, generation: u64, owner: &WalletAddress) -> AcquisitionOutcome {
        debug!(generation, owner = %owner, "asset acquisition started");
        let result = self.fetch_gallery(owner).await;

        if !self.is_current(generation) {
            debug!(generation, "asset acquisition superseded");
            return AcquisitionOutcome::Superseded;
        }

        let outcome = match result {
            Ok(nfts) => {
                let count = nfts.len();
                self.store.set_nft_list(nfts);
                info!(generation, count, "asset gallery loaded");
                AcquisitionOutcome::Loaded(count)
            }
            Err(error) => {
                warn!(generation, %error, "asset acquisition failed");
                self.notifier.notify(Notice::error(error.to_string()));
                AcquisitionOutcome::Failed(error)
            }
        };
        self.store.set_loading_nfts(false);
        outcome
    }

    async fn fetch_gallery(&self, owner: &WalletAddress) -> Result<Vec<Nft>, AcquisitionError> {
        let tokens = self.collection.fetch_tokens(owner).await?;
        let fetches = tokens.iter().map(|token| self.fetch_metadata(token));
        Ok(try_join_all(fetches).await?)
    }

    async fn fetch_metadata(&self, token: &NftToken) -> Result<Nft, MetadataSourceError> {
        let uri = token
            .token_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| MetadataSourceError::missing_uri(token.token_id.clone()))?;
        self.metadata.fetch(uri).await
    }
}

impl<C, M, N> AssetAcquisition<C, M, N>
where
    C: CollectionSource + 'static,
    M: MetadataSource + 'static,
    N: Notifier + 'static,
{
    /// Follow wallet connection changes, starting one run per new address.
    ///
    /// A wallet already connected when the watcher starts is fetched
    /// immediately. Disconnecting supersedes any in-flight run. The task runs
    /// until the returned handle is aborted. Runs inherit the caller's
    /// [`TraceId`], or share a fresh one when none is in scope.
    pub fn watch_wallet_changes(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut changes = self.store.subscribe();
        let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
        tokio::spawn(TraceId::scope(trace_id, async move {
            let mut current = changes.borrow_and_update().wallet.address().cloned();
            if let Some(owner) = current.clone() {
                this.spawn_acquire(owner);
            }
            while changes.changed().await.is_ok() {
                let next = changes.borrow_and_update().wallet.address().cloned();
                if next == current {
                    continue;
                }
                current = next;
                match current.clone() {
                    Some(owner) => this.spawn_acquire(owner),
                    None => this.invalidate(),
                }
            }
            debug!("wallet watcher stopped");
        }))
    }

    // The generation is taken before spawning so runs are ordered by wallet
    // change, not by task scheduling.
    fn spawn_acquire(self: &Arc<Self>, owner: WalletAddress) {
        let generation = self.start();
        let this = Arc::clone(self);
        let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
        tokio::spawn(TraceId::scope(trace_id, async move {
            this.settle(generation, &owner).await;
        }));
    }
}

#[cfg(test)]
#[path = "assets_tests.rs"]
mod tests;
