//! Orchestrator for logical documents stored as chunked remote content.
//!
//! `PromptStore` composes the splitter, joiner, and reconciler with an
//! injected [`DocumentApi`] port. All fallibility lives here: the pure
//! functions it composes never fail, and every port error surfaces as a
//! tagged [`PsError`](ps_core::PsError).

use std::sync::Arc;

use ps_core::{ChunkBlock, Document, DocumentApi, DocumentPatch, PsResult};

use crate::chunk::{join_chunks, split_text};
use crate::reconcile::reconcile;

pub struct PromptStore {
    api: Arc<dyn DocumentApi>,
    max_chunk_size: usize,
}

impl PromptStore {
    pub fn new(api: Arc<dyn DocumentApi>, max_chunk_size: usize) -> Self {
        Self {
            api,
            max_chunk_size,
        }
    }

    /// Create a document, splitting `content` across as many remote content
    /// blocks as needed.
    ///
    /// Block identities are not cached locally; they are re-fetched on the
    /// next read. There is no rollback if appending fails part-way: the page
    /// is left with whatever blocks were written before the error.
    pub async fn create(&self, title: &str, content: &str) -> PsResult<Document> {
        let chunks = split_text(content, self.max_chunk_size);
        let page = self.api.create_page(title).await?;
        self.api.append_content_blocks(&page.id, &chunks).await?;

        tracing::debug!(page = %page.id, chunks = chunks.len(), "created chunked document");

        Ok(Document {
            id: page.id,
            title: title.to_string(),
            content: join_chunks(&chunks),
            url: page.url,
            created_at: None,
            updated_at: None,
        })
    }

    /// Fetch a document, reassembling its content from the ordered content
    /// blocks. Non-content child blocks are ignored.
    pub async fn get(&self, id: &str) -> PsResult<Document> {
        let page = self.api.get_page(id).await?;
        let texts: Vec<String> = self
            .api
            .list_child_blocks(id)
            .await?
            .into_iter()
            .filter(|block| block.is_content())
            .map(|block| block.text.unwrap_or_default())
            .collect();

        Ok(Document {
            id: page.id,
            title: page.title,
            content: join_chunks(&texts),
            url: page.url,
            created_at: page.created_at,
            updated_at: page.updated_at,
        })
    }

    /// Apply a partial update, reconciling remote blocks against the new
    /// content with the fewest mutations: unchanged positions are not
    /// touched, updates run before appends or deletes so block numbering
    /// matches the final desired order.
    ///
    /// Fails on the first port error without rolling back already-applied
    /// mutations.
    pub async fn update(&self, id: &str, patch: &DocumentPatch) -> PsResult<Document> {
        if let Some(title) = &patch.title {
            self.api.update_page_title(id, title).await?;
        }

        if let Some(content) = &patch.content {
            let existing = self.content_blocks(id).await?;
            let desired = split_text(content, self.max_chunk_size);
            let plan = reconcile(&existing, &desired);

            tracing::debug!(
                page = %id,
                updates = plan.updates.len(),
                appends = plan.appends.len(),
                deletes = plan.deletes.len(),
                "executing chunk plan"
            );

            for update in &plan.updates {
                self.api
                    .update_content_block(&update.remote_id, &update.text)
                    .await?;
            }
            if !plan.appends.is_empty() {
                self.api.append_content_blocks(id, &plan.appends).await?;
            }
            for remote_id in &plan.deletes {
                self.api.delete_block(remote_id).await?;
            }
        }

        self.get(id).await
    }

    /// List the documents under a container page.
    ///
    /// A retrieval failure for one entry does not fail the whole listing;
    /// the entry is logged and skipped.
    pub async fn list(&self, container_id: &str) -> PsResult<Vec<Document>> {
        let children = self.api.list_child_blocks(container_id).await?;

        let mut documents = Vec::new();
        for child in children.iter().filter(|child| child.is_child_document()) {
            match self.get(&child.id).await {
                Ok(document) => documents.push(document),
                Err(err) => {
                    tracing::warn!(entry = %child.id, error = %err, "skipping unreadable document entry");
                }
            }
        }
        Ok(documents)
    }

    /// Current ordered content blocks of a page, with their positions.
    async fn content_blocks(&self, page_id: &str) -> PsResult<Vec<ChunkBlock>> {
        let children = self.api.list_child_blocks(page_id).await?;
        Ok(children
            .into_iter()
            .filter(|block| block.is_content())
            .enumerate()
            .map(|(ordinal, block)| ChunkBlock {
                remote_id: block.id,
                ordinal,
                text: block.text.unwrap_or_default(),
            })
            .collect())
    }
}
