// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-size text chunking for knowledge-base ingestion.

/// Split `text` into windows of `size` characters, each starting
/// `size - overlap` characters after the previous one.
///
/// Windows are measured in `char`s so multi-byte text is never split inside
/// a code point. Chunks are trimmed and blank chunks dropped. An `overlap`
/// that is not smaller than `size` is clamped to `size - 1`.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }
    let step = size - overlap.min(size - 1);

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
