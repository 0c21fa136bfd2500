use anyhow::{Context, Result};
use engine::tokenizer::tokenize;
use engine::Corpus;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One flattened passage, as written by the `ingest` tool: the passage
/// text plus the provenance fields carried through to search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageRecord {
    pub id: String,
    pub query_id: u64,
    pub query: String,
    pub passage: String,
    pub is_selected: bool,
}

/// Load a flat passage JSONL file into a corpus, tokenizing each
/// passage and carrying the full record along as opaque metadata.
///
/// Passages that tokenize to nothing are skipped. Any I/O or parse
/// failure is fatal: the server must not start on a partially loaded
/// corpus.
pub fn load_corpus<P: AsRef<Path>>(path: P, max_docs: Option<usize>) -> Result<Corpus> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("opening corpus file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut corpus = Corpus::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading {} line {}", path.display(), line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: PassageRecord = serde_json::from_str(&line)
            .with_context(|| format!("parsing {} line {}", path.display(), line_no + 1))?;
        let tokens = tokenize(&record.passage);
        if tokens.is_empty() {
            continue;
        }
        let metadata = serde_json::to_value(&record)?;
        corpus.push(tokens, metadata);
        if max_docs.is_some_and(|max| corpus.len() >= max) {
            break;
        }
    }

    tracing::info!(documents = corpus.len(), path = %path.display(), "loaded corpus");
    Ok(corpus)
}
