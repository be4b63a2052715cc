//! Context formatting for answer generation.

use crate::index::ScoredChunk;

/// Format retrieved chunks for inclusion in a prompt, in retrieval order.
pub fn format_context_for_prompt(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, scored)| format!("---\n[{}]\n{}\n---", i + 1, scored.chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
