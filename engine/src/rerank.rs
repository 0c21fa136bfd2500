use crate::bm25::{self, Bm25Params};
use crate::cosine;
use crate::stats::TermStats;
use crate::vector::VectorIndex;
use crate::DocId;

/// First-stage scorer: narrows the whole corpus to a bounded shortlist.
pub trait CandidateGenerator {
    /// Top `k` candidates scored against `query`, best first, with ties
    /// broken by ascending document id.
    fn generate(&self, query: &[String], k: usize) -> Vec<(DocId, f32)>;
}

/// Second-stage scorer: rescoring restricted to an explicit shortlist.
pub trait CandidateReranker {
    /// One score per id in `doc_ids`, aligned with the input order.
    fn rescore(&self, query: &[String], doc_ids: &[DocId]) -> Vec<f32>;
}

/// BM25 recall over the term-statistics index.
pub struct Bm25Generator<'a> {
    pub stats: &'a TermStats,
    pub params: Bm25Params,
}

impl CandidateGenerator for Bm25Generator<'_> {
    fn generate(&self, query: &[String], k: usize) -> Vec<(DocId, f32)> {
        bm25::top_k(self.stats, &self.params, query, k)
    }
}

/// TF-IDF cosine rescoring over the fitted vector space.
pub struct CosineReranker<'a> {
    pub index: &'a VectorIndex,
}

impl CandidateReranker for CosineReranker<'_> {
    fn rescore(&self, query: &[String], doc_ids: &[DocId]) -> Vec<f32> {
        let query_vector = self.index.transform(query);
        cosine::score_subset(self.index, &query_vector, doc_ids)
    }
}

/// Two-stage hybrid ranking: recall with the generator, rescore the
/// shortlist with the reranker, max-normalize each signal, and fuse with
/// `combined = alpha * lexical + (1 - alpha) * similarity`.
pub struct HybridRanker<G, R> {
    pub generator: G,
    pub reranker: R,
    /// Shortlist width handed from recall to the reranker.
    pub rerank_count: usize,
}

impl<G: CandidateGenerator, R: CandidateReranker> HybridRanker<G, R> {
    /// Rank `query` and return the fused top `top_k` as (doc id, score),
    /// descending score with ties broken by ascending document id.
    pub fn retrieve(&self, query: &[String], alpha: f32, top_k: usize) -> Vec<(DocId, f32)> {
        let candidates = self.generator.generate(query, self.rerank_count);
        if candidates.is_empty() {
            return Vec::new();
        }

        let ids: Vec<DocId> = candidates.iter().map(|&(id, _)| id).collect();
        let mut lexical: Vec<f32> = candidates.iter().map(|&(_, s)| s).collect();
        let mut similarity = self.reranker.rescore(query, &ids);
        debug_assert_eq!(lexical.len(), similarity.len());

        max_normalize(&mut lexical);
        max_normalize(&mut similarity);

        let mut fused: Vec<(DocId, f32)> = ids
            .iter()
            .zip(lexical.iter().zip(similarity.iter()))
            .map(|(&id, (&l, &s))| (id, alpha * l + (1.0 - alpha) * s))
            .collect();
        fused.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        fused.truncate(top_k);
        fused
    }
}

/// Scale scores into [0, 1] by dividing by the array maximum. A maximum
/// of zero or below leaves the array unchanged (divisor forced to 1) so
/// an unmatched signal cannot poison the blend with NaNs.
fn max_normalize(scores: &mut [f32]) {
    let max = scores.iter().copied().fold(f32::MIN, f32::max);
    if max > 0.0 {
        for s in scores.iter_mut() {
            *s /= max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use crate::Corpus;
    use serde_json::json;

    fn corpus(texts: &[&str]) -> Corpus {
        let mut c = Corpus::new();
        for t in texts {
            c.push(tokenize(t), json!(null));
        }
        c
    }

    fn ranker<'a>(
        stats: &'a TermStats,
        index: &'a VectorIndex,
        rerank_count: usize,
    ) -> HybridRanker<Bm25Generator<'a>, CosineReranker<'a>> {
        HybridRanker {
            generator: Bm25Generator {
                stats,
                params: Bm25Params::default(),
            },
            reranker: CosineReranker { index },
            rerank_count,
        }
    }

    #[test]
    fn max_normalize_bounds_scores() {
        let mut scores = vec![2.0, 4.0, 1.0];
        max_normalize(&mut scores);
        assert_eq!(scores, vec![0.5, 1.0, 0.25]);
        assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn max_normalize_leaves_all_zero_untouched() {
        let mut scores = vec![0.0, 0.0];
        max_normalize(&mut scores);
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn rerank_count_one_pins_the_bm25_winner() {
        // Doc 3 is the only one containing the query term.
        let c = corpus(&["aa bb", "cc dd", "ee ff", "target word", "gg hh"]);
        let stats = TermStats::build(&c);
        let index = VectorIndex::fit(&c);
        let query = tokenize("target");
        for alpha in [0.0, 0.5, 1.0] {
            let top = ranker(&stats, &index, 1).retrieve(&query, alpha, 10);
            assert_eq!(top.len(), 1);
            assert_eq!(top[0].0, 3);
        }
    }

    #[test]
    fn rerank_count_zero_returns_nothing() {
        let c = corpus(&["aa", "bb"]);
        let stats = TermStats::build(&c);
        let index = VectorIndex::fit(&c);
        assert!(ranker(&stats, &index, 0)
            .retrieve(&tokenize("aa"), 0.5, 10)
            .is_empty());
    }

    #[test]
    fn alpha_one_matches_pure_lexical_order() {
        let c = corpus(&[
            "rust rust rust language",
            "rust language",
            "python language",
            "rust",
        ]);
        let stats = TermStats::build(&c);
        let index = VectorIndex::fit(&c);
        let query = tokenize("rust language");

        let lexical = bm25::top_k(&stats, &Bm25Params::default(), &query, 100);
        let fused = ranker(&stats, &index, 100).retrieve(&query, 1.0, 100);
        let lexical_ids: Vec<_> = lexical.iter().map(|&(d, _)| d).collect();
        let fused_ids: Vec<_> = fused.iter().map(|&(d, _)| d).collect();
        assert_eq!(fused_ids, lexical_ids);
    }

    #[test]
    fn alpha_zero_matches_pure_similarity_order() {
        let c = corpus(&[
            "shared term alpha alpha",
            "shared term",
            "shared term beta",
            "alpha beta",
        ]);
        let stats = TermStats::build(&c);
        let index = VectorIndex::fit(&c);
        let query = tokenize("shared term");

        let fused = ranker(&stats, &index, 100).retrieve(&query, 0.0, 100);

        let candidates = bm25::top_k(&stats, &Bm25Params::default(), &query, 100);
        let ids: Vec<DocId> = candidates.iter().map(|&(d, _)| d).collect();
        let qv = index.transform(&query);
        let sims = cosine::score_subset(&index, &qv, &ids);
        let mut expected: Vec<(DocId, f32)> = ids.into_iter().zip(sims).collect();
        expected.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        let expected_ids: Vec<_> = expected.iter().map(|&(d, _)| d).collect();
        let fused_ids: Vec<_> = fused.iter().map(|&(d, _)| d).collect();
        assert_eq!(fused_ids, expected_ids);
    }

    #[test]
    fn fused_scores_are_non_increasing_and_bounded() {
        let c = corpus(&[
            "alpha beta gamma",
            "alpha beta",
            "beta gamma",
            "alpha gamma delta",
        ]);
        let stats = TermStats::build(&c);
        let index = VectorIndex::fit(&c);
        let top = ranker(&stats, &index, 100).retrieve(&tokenize("alpha beta"), 0.5, 10);
        assert!(!top.is_empty());
        for pair in top.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        for &(_, s) in &top {
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
