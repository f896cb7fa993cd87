//! Chunked document content store.
//!
//! Persists arbitrarily long free text ("prompts") inside an external
//! hierarchical document API whose primitive nodes enforce a hard per-node
//! text-size limit. Content is split into size-bounded chunks at sensible
//! boundaries, stored one chunk per remote block, reassembled on read, and
//! reconciled on update with the minimum number of remote mutations.

pub mod chunk;
pub mod clients;
pub mod config;
pub mod notion;
pub mod reconcile;
pub mod store;

pub use chunk::{join_chunks, split_text};
pub use clients::ClientCache;
pub use config::{NotionConfig, StoreConfig, DEFAULT_MAX_CHUNK_SIZE};
pub use notion::NotionApi;
pub use reconcile::reconcile;
pub use store::PromptStore;
