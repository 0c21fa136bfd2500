use crate::{Corpus, DocId, FeatureId};
use std::collections::{HashMap, HashSet};

/// A feature must appear in at least this many documents to be retained.
pub const MIN_DOC_FREQ: u32 = 2;
/// A feature appearing in more than this fraction of documents is dropped.
pub const MAX_DOC_FRACTION: f32 = 0.85;

/// An L2-normalized sparse weight vector, entries sorted by feature id.
#[derive(Debug, Clone, Default)]
pub struct SparseVector {
    entries: Vec<(FeatureId, f32)>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(FeatureId, f32)] {
        &self.entries
    }

    /// Dot product via a merge walk over the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (fa, wa) = self.entries[i];
            let (fb, wb) = other.entries[j];
            match fa.cmp(&fb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn from_weights(mut entries: Vec<(FeatureId, f32)>) -> Self {
        entries.sort_unstable_by_key(|&(f, _)| f);
        let norm: f32 = entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }
        Self { entries }
    }
}

/// TF-IDF vector space over unigram and bigram features.
///
/// Fitted once over the corpus and frozen: document-frequency pruning
/// (`MIN_DOC_FREQ`, `MAX_DOC_FRACTION`), sublinear term-frequency
/// scaling (`1 + ln(tf)`), smoothed IDF (`ln((1 + N) / (1 + df)) + 1`),
/// and per-document L2 normalization. Feature ids are assigned in
/// lexicographic feature order so fits are deterministic.
#[derive(Debug)]
pub struct VectorIndex {
    vocabulary: HashMap<String, FeatureId>,
    idf: Vec<f32>,
    doc_vectors: Vec<SparseVector>,
}

/// Candidate features of one token sequence: every unigram plus every
/// bigram over adjacent tokens.
fn extract_features(tokens: &[String]) -> Vec<String> {
    let mut features: Vec<String> = Vec::with_capacity(tokens.len().saturating_mul(2));
    features.extend(tokens.iter().cloned());
    for pair in tokens.windows(2) {
        features.push(format!("{} {}", pair[0], pair[1]));
    }
    features
}

impl VectorIndex {
    /// Fit the vocabulary and document vectors over the whole corpus.
    pub fn fit(corpus: &Corpus) -> Self {
        let num_docs = corpus.len();

        // Document frequency of every candidate feature.
        let mut df: HashMap<String, u32> = HashMap::new();
        for doc in corpus.iter() {
            let mut seen: HashSet<String> = HashSet::new();
            for feature in extract_features(&doc.tokens) {
                if seen.insert(feature.clone()) {
                    *df.entry(feature).or_insert(0) += 1;
                }
            }
        }

        // Apply document-frequency bounds, then assign ids in sorted
        // feature order for a deterministic vocabulary.
        let max_df = MAX_DOC_FRACTION * num_docs as f32;
        let mut retained: Vec<(String, u32)> = df
            .into_iter()
            .filter(|&(_, d)| d >= MIN_DOC_FREQ && d as f32 <= max_df)
            .collect();
        retained.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut vocabulary: HashMap<String, FeatureId> = HashMap::with_capacity(retained.len());
        let n = num_docs as f32;
        let mut idf: Vec<f32> = Vec::with_capacity(retained.len());
        for (fid, (feature, d)) in retained.into_iter().enumerate() {
            vocabulary.insert(feature, fid as FeatureId);
            idf.push(((1.0 + n) / (1.0 + d as f32)).ln() + 1.0);
        }

        let mut index = Self {
            vocabulary,
            idf,
            doc_vectors: Vec::with_capacity(num_docs),
        };
        for doc in corpus.iter() {
            let vector = index.weigh(&doc.tokens);
            index.doc_vectors.push(vector);
        }
        index
    }

    /// Project a token sequence into the frozen vector space.
    /// Out-of-vocabulary features contribute nothing; a query with no
    /// known features maps to the zero vector.
    pub fn transform(&self, tokens: &[String]) -> SparseVector {
        self.weigh(tokens)
    }

    pub fn doc_vector(&self, doc_id: DocId) -> &SparseVector {
        &self.doc_vectors[doc_id as usize]
    }

    pub fn num_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn num_docs(&self) -> usize {
        self.doc_vectors.len()
    }

    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut tf: HashMap<FeatureId, u32> = HashMap::new();
        for feature in extract_features(tokens) {
            if let Some(&fid) = self.vocabulary.get(&feature) {
                *tf.entry(fid).or_insert(0) += 1;
            }
        }
        let weights: Vec<(FeatureId, f32)> = tf
            .into_iter()
            .map(|(fid, count)| {
                let sublinear_tf = 1.0 + (count as f32).ln();
                (fid, sublinear_tf * self.idf[fid as usize])
            })
            .collect();
        SparseVector::from_weights(weights)
    }
}
