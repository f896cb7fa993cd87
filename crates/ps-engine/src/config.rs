use serde::{Deserialize, Serialize};

/// Remote rich-text nodes reject payloads above 2000 characters; the default
/// chunk size leaves headroom for the API's own accounting.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1950;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound on the character length of a single content chunk.
    pub max_chunk_size: usize,
    #[serde(default)]
    pub notion: NotionConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            notion: NotionConfig::default(),
        }
    }
}

/// Connection settings for the Notion document API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Base URL of the API. Overridable for tests.
    pub base_url: String,
    /// Value of the `Notion-Version` header.
    pub version: String,
    /// Page under which new prompt pages are created.
    pub parent_page_id: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com".into(),
            version: "2022-06-28".into(),
            parent_page_id: None,
            timeout_secs: 30,
        }
    }
}
