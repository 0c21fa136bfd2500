use crate::bm25::Bm25Params;
use crate::error::EngineError;
use crate::rerank::{Bm25Generator, CosineReranker, HybridRanker};
use crate::stats::TermStats;
use crate::tokenizer::tokenize;
use crate::vector::VectorIndex;
use crate::{Corpus, DocId};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_RERANK_COUNT: usize = 100;
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_ALPHA: f32 = 0.5;

/// Engine construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub bm25: Bm25Params,
    /// Width of the BM25 shortlist handed to the cosine reranker.
    pub rerank_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            rerank_count: DEFAULT_RERANK_COUNT,
        }
    }
}

/// One externally visible search hit. `rank` is 1-based and dense;
/// `metadata` is the record supplied at ingestion, passed through
/// untouched.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub rank: usize,
    pub doc_id: DocId,
    pub metadata: Value,
    pub score: f32,
}

/// The retrieval facade: owns the corpus and both indices, all built
/// eagerly at construction and immutable afterward. `search` takes
/// `&self` and allocates only per-query transients, so one engine can
/// serve any number of concurrent queries without locking.
#[derive(Debug)]
pub struct SearchEngine {
    corpus: Corpus,
    stats: TermStats,
    vectors: VectorIndex,
    config: EngineConfig,
}

impl SearchEngine {
    /// Validate the configuration, then build the term-statistics index
    /// and the TF-IDF vector space over `corpus`.
    pub fn new(corpus: Corpus, config: EngineConfig) -> Result<Self, EngineError> {
        config.bm25.validate()?;

        let stats = TermStats::build(&corpus);
        tracing::info!(
            documents = corpus.len(),
            unique_terms = stats.num_terms(),
            "built term statistics index"
        );

        let vectors = VectorIndex::fit(&corpus);
        tracing::info!(
            documents = corpus.len(),
            features = vectors.num_features(),
            "fitted tf-idf vector space"
        );
        tracing::info!(
            rerank_count = config.rerank_count,
            "hybrid ranker will rerank top bm25 candidates with cosine similarity"
        );

        Ok(Self {
            corpus,
            stats,
            vectors,
            config,
        })
    }

    /// Two-stage hybrid search. A query that tokenizes to nothing
    /// returns an empty result set; that is an empty-result policy, not
    /// an error.
    pub fn search(&self, query_text: &str, top_k: usize, alpha: f32) -> Vec<SearchResult> {
        let query = tokenize(query_text);
        if query.is_empty() {
            return Vec::new();
        }

        let ranker = HybridRanker {
            generator: Bm25Generator {
                stats: &self.stats,
                params: self.config.bm25,
            },
            reranker: CosineReranker {
                index: &self.vectors,
            },
            rerank_count: self.config.rerank_count,
        };

        ranker
            .retrieve(&query, alpha, top_k)
            .into_iter()
            .enumerate()
            .map(|(i, (doc_id, score))| SearchResult {
                rank: i + 1,
                doc_id,
                metadata: self.corpus.metadata(doc_id).clone(),
                score,
            })
            .collect()
    }

    pub fn document_count(&self) -> usize {
        self.corpus.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
