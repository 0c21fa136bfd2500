use crate::{Corpus, DocId, TermId};
use std::collections::HashMap;

/// Term statistics for a fixed corpus: document frequencies, per-term
/// postings with raw occurrence counts, document lengths, and
/// precomputed IDF weights.
///
/// Terms are interned into dense ids at build time so the scoring hot
/// path walks contiguous arrays instead of hashing strings per document.
/// Everything here is computed once by [`TermStats::build`] and never
/// mutated, which makes the index safe to share across concurrent
/// queries without locking.
#[derive(Debug)]
pub struct TermStats {
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    idf: Vec<f32>,
    /// Per term id: (doc id, occurrence count), sorted by doc id.
    postings: Vec<Vec<(DocId, u32)>>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f32,
    num_docs: u32,
}

impl TermStats {
    /// Build statistics over the whole corpus. Accepts any corpus,
    /// including an empty one (zero terms, `avg_doc_length` of 0).
    pub fn build(corpus: &Corpus) -> Self {
        let num_docs = corpus.len() as u32;
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut postings: Vec<Vec<(DocId, u32)>> = Vec::new();
        let mut doc_lengths: Vec<u32> = Vec::with_capacity(corpus.len());

        for (doc_id, doc) in corpus.iter().enumerate() {
            let doc_id = doc_id as DocId;
            doc_lengths.push(doc.tokens.len() as u32);

            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in &doc.tokens {
                let next_id = dictionary.len() as TermId;
                let tid = *dictionary.entry(term.clone()).or_insert(next_id);
                if tid as usize == df.len() {
                    df.push(0);
                    postings.push(Vec::new());
                }
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            for (tid, count) in tf_counts {
                df[tid as usize] += 1;
                postings[tid as usize].push((doc_id, count));
            }
        }

        // Postings were filled out of per-document hash-map order.
        for plist in postings.iter_mut() {
            plist.sort_unstable_by_key(|&(doc_id, _)| doc_id);
        }

        let total_len: u64 = doc_lengths.iter().map(|&l| l as u64).sum();
        let avg_doc_length = if num_docs > 0 {
            total_len as f32 / num_docs as f32
        } else {
            0.0
        };

        let n = num_docs as f32;
        let idf = df
            .iter()
            .map(|&d| {
                let d = d as f32;
                (1.0 + (n - d + 0.5) / (d + 0.5)).ln()
            })
            .collect();

        Self {
            dictionary,
            df,
            idf,
            postings,
            doc_lengths,
            avg_doc_length,
            num_docs,
        }
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    /// IDF weight of a term; 0 for terms absent from the corpus, so
    /// unknown query tokens contribute nothing to a score.
    pub fn idf(&self, term: &str) -> f32 {
        self.term_id(term)
            .map(|tid| self.idf[tid as usize])
            .unwrap_or(0.0)
    }

    pub fn idf_by_id(&self, tid: TermId) -> f32 {
        self.idf[tid as usize]
    }

    /// Raw occurrence count of `term` in `doc_id`; 0 when absent.
    pub fn term_frequency(&self, term: &str, doc_id: DocId) -> u32 {
        self.term_id(term)
            .and_then(|tid| {
                let plist = &self.postings[tid as usize];
                plist
                    .binary_search_by_key(&doc_id, |&(d, _)| d)
                    .ok()
                    .map(|i| plist[i].1)
            })
            .unwrap_or(0)
    }

    pub fn postings(&self, tid: TermId) -> &[(DocId, u32)] {
        &self.postings[tid as usize]
    }

    pub fn document_frequency(&self, term: &str) -> u32 {
        self.term_id(term)
            .map(|tid| self.df[tid as usize])
            .unwrap_or(0)
    }

    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths[doc_id as usize]
    }

    pub fn avg_doc_length(&self) -> f32 {
        self.avg_doc_length
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }
}
