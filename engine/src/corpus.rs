use crate::DocId;
use serde_json::Value;

/// A single tokenized passage plus the opaque metadata record supplied by
/// the ingestion side. The engine never looks inside `metadata`; it only
/// carries it through to search results.
#[derive(Debug, Clone)]
pub struct Document {
    pub tokens: Vec<String>,
    pub metadata: Value,
}

/// An ordered, immutable collection of documents. A document's id is its
/// position in the corpus, fixed for the lifetime of the engine.
#[derive(Debug, Default)]
pub struct Corpus {
    docs: Vec<Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tokens: Vec<String>, metadata: Value) {
        self.docs.push(Document { tokens, metadata });
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn tokens(&self, doc_id: DocId) -> &[String] {
        &self.docs[doc_id as usize].tokens
    }

    pub fn metadata(&self, doc_id: DocId) -> &Value {
        &self.docs[doc_id as usize].metadata
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self {
            docs: iter.into_iter().collect(),
        }
    }
}
