use crate::error::EngineError;
use crate::stats::TermStats;
use crate::DocId;

/// Okapi BM25 parameters: `k1` controls term-frequency saturation, `b`
/// controls document-length normalization.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(EngineError::Config(format!(
                "bm25 k1 must be finite and non-negative, got {}",
                self.k1
            )));
        }
        if !self.b.is_finite() || !(0.0..=1.0).contains(&self.b) {
            return Err(EngineError::Config(format!(
                "bm25 b must be in [0, 1], got {}",
                self.b
            )));
        }
        Ok(())
    }
}

/// BM25 score of the query against every document in the corpus.
///
/// Query tokens unknown to the index contribute nothing. A repeated
/// query token accumulates its full contribution once per repetition.
/// Returns one score per document; empty for an empty corpus.
pub fn score_all(stats: &TermStats, params: &Bm25Params, query: &[String]) -> Vec<f32> {
    let mut scores = vec![0.0f32; stats.num_docs() as usize];
    if scores.is_empty() {
        return scores;
    }

    let avgdl = stats.avg_doc_length();
    let k1 = params.k1;
    let b = params.b;

    for term in query {
        let Some(tid) = stats.term_id(term) else {
            continue;
        };
        let idf = stats.idf_by_id(tid);
        for &(doc_id, tf) in stats.postings(tid) {
            let tf = tf as f32;
            let dl = stats.doc_length(doc_id) as f32;
            let numerator = tf * (k1 + 1.0);
            let denominator = tf + k1 * (1.0 - b + b * dl / avgdl);
            scores[doc_id as usize] += idf * (numerator / denominator);
        }
    }
    scores
}

/// Top `k` documents by BM25 score, descending, with ties broken by
/// ascending document id. `k` larger than the corpus returns every
/// document; `k == 0` returns nothing.
pub fn top_k(
    stats: &TermStats,
    params: &Bm25Params,
    query: &[String],
    k: usize,
) -> Vec<(DocId, f32)> {
    if k == 0 {
        return Vec::new();
    }
    let scores = score_all(stats, params, query);
    let mut ranked: Vec<(DocId, f32)> = scores
        .into_iter()
        .enumerate()
        .map(|(i, s)| (i as DocId, s))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use crate::Corpus;
    use serde_json::json;

    fn build(texts: &[&str]) -> TermStats {
        let mut c = Corpus::new();
        for t in texts {
            c.push(tokenize(t), json!(null));
        }
        TermStats::build(&c)
    }

    #[test]
    fn exact_match_outscores_nonmatch() {
        // Scenario: "cat" appears only in doc 0.
        let stats = build(&["the cat sat", "the dog ran", "cats and dogs"]);
        let scores = score_all(&stats, &Bm25Params::default(), &tokenize("cat"));
        assert!(scores[0] > 0.0);
        assert!(scores[0] > scores[1]);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn unknown_tokens_score_zero() {
        let stats = build(&["alpha beta", "gamma delta"]);
        let scores = score_all(&stats, &Bm25Params::default(), &tokenize("omega"));
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn repeated_query_token_amplifies() {
        let stats = build(&["alpha beta", "gamma delta"]);
        let once = score_all(&stats, &Bm25Params::default(), &tokenize("alpha"));
        let twice = score_all(&stats, &Bm25Params::default(), &tokenize("alpha alpha"));
        assert!((twice[0] - 2.0 * once[0]).abs() < 1e-6);
    }

    #[test]
    fn empty_corpus_yields_empty_scores() {
        let stats = TermStats::build(&Corpus::new());
        let scores = score_all(&stats, &Bm25Params::default(), &tokenize("anything"));
        assert!(scores.is_empty());
        assert!(top_k(&stats, &Bm25Params::default(), &tokenize("anything"), 5).is_empty());
    }

    #[test]
    fn top_k_orders_and_breaks_ties_by_doc_id() {
        // All-zero scores for an unmatched query: pure id-order prefix.
        let stats = build(&["a", "b", "c", "d"]);
        let top = top_k(&stats, &Bm25Params::default(), &tokenize("zzz"), 3);
        let ids: Vec<_> = top.iter().map(|&(d, _)| d).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn top_k_bounds() {
        let stats = build(&["a", "b"]);
        assert!(top_k(&stats, &Bm25Params::default(), &tokenize("a"), 0).is_empty());
        let all = top_k(&stats, &Bm25Params::default(), &tokenize("a"), 100);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn higher_tf_ranks_first() {
        let stats = build(&["rust rust rust", "rust code"]);
        let top = top_k(&stats, &Bm25Params::default(), &tokenize("rust"), 2);
        assert_eq!(top[0].0, 0);
    }

    #[test]
    fn params_validation() {
        assert!(Bm25Params::default().validate().is_ok());
        assert!(Bm25Params { k1: -1.0, b: 0.75 }.validate().is_err());
        assert!(Bm25Params { k1: 1.5, b: 1.5 }.validate().is_err());
        assert!(Bm25Params {
            k1: f32::NAN,
            b: 0.5
        }
        .validate()
        .is_err());
    }
}
