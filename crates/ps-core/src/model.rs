use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logical document ("prompt") whose content is transparently split across
/// remote content blocks.
///
/// `content` is a derived view, reconstructed on read from the document's
/// chunk blocks. It is never the unit of remote storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One remote content node holding a single chunk of a document's content.
///
/// `ordinal` is the node's position within its parent's ordered child list.
/// The store never reorders blocks, only updates in place and appends or
/// deletes at the tail end of divergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkBlock {
    pub remote_id: String,
    pub ordinal: usize,
    pub text: String,
}

/// A single in-place rewrite of an existing content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockUpdate {
    pub remote_id: String,
    pub text: String,
}

/// The minimal edit script turning an existing ordered block sequence into a
/// desired ordered chunk list. Prefix alignment is positional: surviving
/// blocks keep their position and identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    pub updates: Vec<BlockUpdate>,
    pub appends: Vec<String>,
    pub deletes: Vec<String>,
}

impl ChunkPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.appends.is_empty() && self.deletes.is_empty()
    }

    /// Number of remote mutation calls executing this plan will issue,
    /// counting a batched append as one call.
    pub fn mutation_count(&self) -> usize {
        self.updates.len() + usize::from(!self.appends.is_empty()) + self.deletes.len()
    }
}

/// Page metadata as returned by the document API.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Identity of a freshly created page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub id: String,
    pub url: String,
}

/// Kind of a child node under a page, after validation at the port boundary.
///
/// The remote API grows node types over time; anything unrecognized maps to
/// `Other` and is skipped, never treated as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// A plain content node carrying one chunk of text.
    Content,
    /// A nested document entry.
    ChildDocument,
    Other,
}

/// One child node under a page, in child-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildBlock {
    pub id: String,
    pub kind: BlockKind,
    pub text: Option<String>,
}

impl ChildBlock {
    pub fn is_content(&self) -> bool {
        self.kind == BlockKind::Content
    }

    pub fn is_child_document(&self) -> bool {
        self.kind == BlockKind::ChildDocument
    }
}

/// Partial update to a document. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl DocumentPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }
}
