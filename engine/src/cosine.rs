use crate::vector::{SparseVector, VectorIndex};
use crate::DocId;

/// Cosine similarity of a query vector against each document in
/// `doc_ids`, in the given order.
///
/// Both sides are stored L2-normalized, so the similarity is a sparse
/// dot product; a zero-norm vector on either side yields 0. The cost is
/// bounded by `doc_ids`, never by corpus size: this function is meant
/// for reranking a shortlist, and it only ever touches the ids it is
/// handed.
pub fn score_subset(index: &VectorIndex, query: &SparseVector, doc_ids: &[DocId]) -> Vec<f32> {
    doc_ids
        .iter()
        .map(|&doc_id| query.dot(index.doc_vector(doc_id)))
        .collect()
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

    #[test]
    fn scores_align_with_requested_order() {
        let c = corpus(&["red blue", "red blue", "green pink", "green pink"]);
        let index = VectorIndex::fit(&c);
        let q = index.transform(&tokenize("red blue"));
        let scores = score_subset(&index, &q, &[2, 0, 3]);
        assert_eq!(scores.len(), 3);
        // Position 1 corresponds to doc 0, the lexical twin of the query.
        assert!(scores[1] > scores[0]);
        assert!((scores[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_query_vector_scores_zero() {
        let c = corpus(&["red blue", "red green"]);
        let index = VectorIndex::fit(&c);
        let q = index.transform(&tokenize("unrelated words"));
        assert!(q.is_zero());
        assert_eq!(score_subset(&index, &q, &[0, 1]), vec![0.0, 0.0]);
    }

    #[test]
    fn empty_subset_scores_nothing() {
        let c = corpus(&["red blue", "red green"]);
        let index = VectorIndex::fit(&c);
        let q = index.transform(&tokenize("red"));
        assert!(score_subset(&index, &q, &[]).is_empty());
    }
}
