//! Correlation identifier shared by the proxy server and the dashboard client.
//!
//! The server opens a scope per HTTP request; the client opens one per
//! command and forwards it on proxy calls, so a gallery load can be followed
//! from the CLI log into the server log. Task-locals do not cross
//! `tokio::spawn`, so spawned work must re-enter [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

tokio::task_local! {
    static CURRENT: TraceId;
}

/// UUID correlating one request or client command.
///
/// # Examples
/// ```
/// use parallel_connect::domain::TraceId;
///
/// let id: TraceId = "7d0c2c8e-3a4f-4f4e-9a51-a1cf2a7e5b10".parse().expect("uuid");
/// assert_eq!(id.to_string(), "7d0c2c8e-3a4f-4f4e-9a51-a1cf2a7e5b10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier of the enclosing scope, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `id` as the current identifier.
    pub async fn scope<F: Future>(id: Self, fut: F) -> F::Output {
        CURRENT.scope(id, fut).await
    }

    /// Run `fut` under the enclosing identifier, opening a fresh scope when
    /// none is active.
    ///
    /// # Examples
    /// ```
    /// use parallel_connect::domain::TraceId;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().expect("runtime").block_on(async {
    /// let outer = TraceId::generate();
    /// let seen = TraceId::scope(outer, TraceId::ensure_scope(async { TraceId::current() })).await;
    /// assert_eq!(seen, Some(outer));
    /// assert!(TraceId::ensure_scope(async { TraceId::current() }).await.is_some());
    /// # });
    /// ```
    pub async fn ensure_scope<F: Future>(fut: F) -> F::Output {
        let id = Self::current().unwrap_or_else(Self::generate);
        Self::scope(id, fut).await
    }
}

impl From<Uuid> for TraceId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
