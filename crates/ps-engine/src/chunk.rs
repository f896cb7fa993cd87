//! Splitting logical text into size-bounded chunks and joining chunks back.
//!
//! The remote document API enforces a hard per-node character limit, so a
//! document's content is stored as an ordered sequence of chunks, one per
//! content block. Splitting prefers linguistically sensible boundaries over
//! hard cuts; joining reassembles the displayable text. Both functions are
//! total: they never fail for any string input.

/// Split `text` into ordered chunks of at most `max_chunk_size` characters.
///
/// Text that already fits is returned as a single chunk unchanged, even when
/// empty. Otherwise a prefix is repeatedly cut at the best available boundary
/// within the candidate window, in priority order: paragraph break (`"\n\n"`),
/// line break (`"\n"`), sentence end (`". "`), word gap (`" "`), and finally a
/// hard cut at exactly `max_chunk_size` characters. Boundary characters are
/// consumed and appear in neither chunk, so rejoining is lossy across
/// paragraph breaks (a rejoin always uses a single newline).
pub fn split_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    debug_assert!(max_chunk_size > 0, "max_chunk_size must be positive");

    if char_len(text) <= max_chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while char_len(rest) > max_chunk_size {
        let window_end = byte_index_at(rest, max_chunk_size);
        let candidate = &rest[..window_end];

        let (piece, consumed) = cut_at_boundary(candidate);
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

/// Find the best split point in `candidate`, returning the extracted piece
/// and the number of bytes consumed from the remaining text (piece plus the
/// boundary characters).
fn cut_at_boundary(candidate: &str) -> (&str, usize) {
    // All boundary patterns are ASCII, so the returned byte indexes are
    // always char boundaries.
    if let Some(i) = candidate.rfind("\n\n") {
        return (&candidate[..i], i + 2);
    }
    if let Some(i) = candidate.rfind('\n') {
        return (&candidate[..i], i + 1);
    }
    if let Some(i) = candidate.rfind(". ") {
        return (&candidate[..i], i + 2);
    }
    if let Some(i) = candidate.rfind(' ') {
        return (&candidate[..i], i + 1);
    }
    (candidate, candidate.len())
}

/// Reassemble chunk texts into displayable content.
///
/// A single chunk is returned unchanged. With multiple chunks, each is
/// trimmed, empty survivors are dropped, and the rest are joined with a
/// single newline.
pub fn join_chunks(chunks: &[String]) -> String {
    match chunks {
        [] => String::new(),
        [solo] => solo.clone(),
        many => many
            .iter()
            .map(|chunk| chunk.trim())
            .filter(|chunk| !chunk.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `chars`-th character, or the string's length if it has
/// fewer characters.
fn byte_index_at(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}
