//! Positional diff between an existing remote block sequence and a desired
//! chunk list.
//!
//! Reconciliation preserves node identity for blocks whose position survives:
//! position `i` in the existing sequence maps to position `i` in the desired
//! list. The plan only rewrites positions whose text changed, appends the
//! surplus when the document grew, and deletes the surplus when it shrank.
//! Unchanged positions cost zero remote calls.

use ps_core::{BlockUpdate, ChunkBlock, ChunkPlan};

/// Compute the edit script turning `existing` into `desired`.
///
/// Surviving blocks are never reordered. At most one of `appends` / `deletes`
/// is non-empty. Total function: computing the plan cannot fail; executing it
/// against the remote API is the orchestrator's problem.
pub fn reconcile(existing: &[ChunkBlock], desired: &[String]) -> ChunkPlan {
    let overlap = existing.len().min(desired.len());

    let updates = existing[..overlap]
        .iter()
        .zip(&desired[..overlap])
        .filter(|(block, text)| block.text != **text)
        .map(|(block, text)| BlockUpdate {
            remote_id: block.remote_id.clone(),
            text: text.clone(),
        })
        .collect();

    let appends = desired[overlap..].to_vec();

    let deletes = existing[overlap..]
        .iter()
        .map(|block| block.remote_id.clone())
        .collect();

    ChunkPlan {
        updates,
        appends,
        deletes,
    }
}
