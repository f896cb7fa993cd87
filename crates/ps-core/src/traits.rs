use async_trait::async_trait;

use crate::error::PsResult;
use crate::model::{ChildBlock, PageMeta, PageRef};

/// The external hierarchical-document service (pages + ordered child blocks)
/// the content store persists into.
///
/// Implementations translate transport failures into the tagged error
/// variants at this boundary; callers never see raw HTTP or SDK errors.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Create a page with the given title, returning its identity.
    async fn create_page(&self, title: &str) -> PsResult<PageRef>;

    /// Append one content block per text, in order, as the last children of
    /// `parent_id`.
    async fn append_content_blocks(&self, parent_id: &str, texts: &[String]) -> PsResult<()>;

    /// List the ordered children of `parent_id`. Unrecognized child types are
    /// returned as `BlockKind::Other`, not treated as errors.
    async fn list_child_blocks(&self, parent_id: &str) -> PsResult<Vec<ChildBlock>>;

    /// Replace the text of an existing content block.
    async fn update_content_block(&self, block_id: &str, text: &str) -> PsResult<()>;

    async fn delete_block(&self, block_id: &str) -> PsResult<()>;

    async fn update_page_title(&self, page_id: &str, title: &str) -> PsResult<()>;

    async fn get_page(&self, page_id: &str) -> PsResult<PageMeta>;
}

fn _assert_document_api_object_safe(_: &dyn DocumentApi) {}
