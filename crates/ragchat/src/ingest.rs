// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ragchat ingest` command: load a text file into the knowledge base.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use ragchat_config::RagchatConfig;
use ragchat_context::chunk_text;
use ragchat_core::RagchatError;
use ragchat_core::types::DocumentChunk;
use tracing::info;

use crate::app::KnowledgeBase;
use crate::serve::init_tracing;

/// Chunks `path`, embeds every chunk and writes it to the vector store.
pub async fn run_ingest(config: RagchatConfig, path: &Path) -> Result<(), RagchatError> {
    init_tracing(&config.server.log_level);

    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        RagchatError::InvalidInput(format!("cannot read {}: {e}", path.display()))
    })?;
    let chunks = chunk_text(
        &text,
        config.retrieval.chunk_size,
        config.retrieval.chunk_overlap,
    );
    if chunks.is_empty() {
        return Err(RagchatError::InvalidInput(format!(
            "{} contains no text",
            path.display()
        )));
    }

    let kb = KnowledgeBase::from_config(&config)?;
    let progress = ProgressBar::new(chunks.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} chunks {msg}") {
        progress.set_style(style);
    }

    let inserted = ingest_chunks(&kb, &config.weaviate.class_name, chunks, &progress).await;
    progress.finish_and_clear();
    let inserted = inserted?;

    info!(inserted, file = %path.display(), class = %config.weaviate.class_name, "ingest complete");
    println!("ingested {inserted} chunks from {}", path.display());
    Ok(())
}

/// Embeds and stores `chunks` in order, stopping at the first failure.
pub async fn ingest_chunks(
    kb: &KnowledgeBase,
    class_name: &str,
    chunks: Vec<String>,
    progress: &ProgressBar,
) -> Result<usize, RagchatError> {
    let mut inserted = 0;
    for text in chunks {
        let vector = kb.embedder.embed(&text).await?;
        kb.vector_store
            .upsert(DocumentChunk { text, vector }, class_name)
            .await?;
        inserted += 1;
        progress.inc(1);
    }
    Ok(inserted)
}
