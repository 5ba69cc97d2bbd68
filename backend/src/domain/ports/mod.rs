//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod collection_query;
mod collection_source;
mod metadata_source;
mod nft_indexer;
mod notifier;
mod session_storage;
mod user_directory;

#[cfg(test)]
pub use collection_query::MockCollectionQuery;
pub use collection_query::CollectionQuery;
#[cfg(test)]
pub use collection_source::MockCollectionSource;
pub use collection_source::{CollectionSource, CollectionSourceError};
#[cfg(test)]
pub use metadata_source::MockMetadataSource;
pub use metadata_source::{MetadataSource, MetadataSourceError};
#[cfg(test)]
pub use nft_indexer::MockNftIndexer;
pub use nft_indexer::{FixtureNftIndexer, NftIndexer, NftIndexerError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notice, NoticeLevel, Notifier, RecordingNotifier};
#[cfg(test)]
pub use session_storage::MockSessionStorage;
pub use session_storage::{
    InMemorySessionStorage, SESSION_MARKER_KEY, SessionStorage, SessionStorageError,
};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{InMemoryUserDirectory, UserDirectory, UserDirectoryError};
