//! Chunker — splits long documents into bounded-size pieces.
//!
//! Documents over the word threshold are split on word boundaries into
//! consecutive ≤1500-word groups, each persisted beside the source as
//! `<stem>_chunk<N>.txt` for traceability. Rejoining the returned chunks
//! on single spaces reproduces the source's token sequence exactly.

use std::path::Path;

/// Word count above which a document is split.
pub const MAX_CHUNK_WORDS: usize = 1500;

/// Split `text` into persisted chunks if it exceeds the word threshold.
///
/// Returns the ordered chunk texts and whether a split happened. Short
/// texts come back as a single unchanged chunk with `false`. A chunk
/// whose sibling file fails to write is dropped from the returned set;
/// the remaining chunks are unaffected.
pub async fn chunk_if_needed(
    text: &str,
    source_name: &str,
    output_dir: &Path,
) -> (Vec<String>, bool) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= MAX_CHUNK_WORDS {
        return (vec![text.to_owned()], false);
    }

    tracing::info!(source = source_name, words = words.len(), "splitting large document");

    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_name);

    let mut chunks = Vec::new();
    for (i, group) in words.chunks(MAX_CHUNK_WORDS).enumerate() {
        let chunk = group.join(" ");
        let chunk_path = output_dir.join(format!("{stem}_chunk{}.txt", i + 1));

        match tokio::fs::write(&chunk_path, &chunk).await {
            Ok(()) => chunks.push(chunk),
            Err(e) => {
                tracing::error!(
                    chunk = i + 1,
                    source = source_name,
                    error = %e,
                    "failed to persist chunk"
                );
            }
        }
    }

    tracing::info!(count = chunks.len(), source = source_name, "chunks created");
    (chunks, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[tokio::test]
    async fn short_text_returned_unchanged() {
        let tmp = TempDir::new().expect("tempdir");
        let text = words(1500);
        let (chunks, was_split) = chunk_if_needed(&text, "search_data_1.txt", tmp.path()).await;
        assert!(!was_split);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
        // No chunk files written.
        assert!(!tmp.path().join("search_data_1_chunk1.txt").exists());
    }

    #[tokio::test]
    async fn long_text_split_and_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let text = words(3200);
        let (chunks, was_split) = chunk_if_needed(&text, "search_data_2.txt", tmp.path()).await;
        assert!(was_split);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].split_whitespace().count(), 1500);
        assert_eq!(chunks[1].split_whitespace().count(), 1500);
        assert_eq!(chunks[2].split_whitespace().count(), 200);

        for i in 1..=3 {
            let path = tmp.path().join(format!("search_data_2_chunk{i}.txt"));
            assert!(path.exists(), "chunk file {i} should exist");
        }
    }

    #[tokio::test]
    async fn rejoined_chunks_reproduce_token_sequence() {
        let tmp = TempDir::new().expect("tempdir");
        let text = words(4000);
        let (chunks, was_split) = chunk_if_needed(&text, "doc.txt", tmp.path()).await;
        assert!(was_split);
        assert_eq!(chunks.join(" "), text);
    }

    #[tokio::test]
    async fn persisted_chunk_matches_returned_chunk() {
        let tmp = TempDir::new().expect("tempdir");
        let text = words(1600);
        let (chunks, _) = chunk_if_needed(&text, "doc.txt", tmp.path()).await;
        let on_disk = tokio::fs::read_to_string(tmp.path().join("doc_chunk1.txt"))
            .await
            .expect("read chunk");
        assert_eq!(on_disk, chunks[0]);
    }

    #[tokio::test]
    async fn write_failure_drops_chunk_without_aborting() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("nonexistent_subdir");
        let text = words(3200);
        // Output dir does not exist, so every write fails; the split
        // itself still completes without error.
        let (chunks, was_split) = chunk_if_needed(&text, "doc.txt", &missing).await;
        assert!(was_split);
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn exactly_threshold_plus_one_splits() {
        let tmp = TempDir::new().expect("tempdir");
        let text = words(1501);
        let (chunks, was_split) = chunk_if_needed(&text, "doc.txt", tmp.path()).await;
        assert!(was_split);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "w1500");
    }
}
