//! Retrieval and prompt context formatting.

use super::ChatTurn;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{Document, VectorStore};
use std::sync::Arc;

/// Fetches the chunks most relevant to a query from one video's index.
#[derive(Clone)]
pub struct Retriever {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever returning four chunks per query.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            top_k: 4,
        }
    }

    /// Set the number of chunks returned per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Number of chunks returned per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Number of chunks in the underlying index.
    pub async fn document_count(&self) -> Result<usize> {
        self.vector_store.document_count().await
    }

    /// Retrieve the chunks nearest to `query`, most similar first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
        let query_embedding = self.embedder.embed(query).await?;

        let results = self.vector_store.search(&query_embedding, self.top_k).await?;

        Ok(results.into_iter().map(|r| r.document).collect())
    }
}

/// Join retrieved chunks into the context block of the QA prompt.
pub fn format_context_for_prompt(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render prior turns as a transcript for the condense prompt.
pub fn format_chat_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("\nHuman: {}\nAssistant: {}", turn.question, turn.answer))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_chat_history() {
        let history = vec![
            ChatTurn::new("What is Rust?", "A systems language."),
            ChatTurn::new("Who made it?", "Mozilla, originally."),
        ];
        assert_eq!(
            format_chat_history(&history),
            "\nHuman: What is Rust?\nAssistant: A systems language.\nHuman: Who made it?\nAssistant: Mozilla, originally."
        );
        assert_eq!(format_chat_history(&[]), "");
    }

    #[test]
    fn test_format_context() {
        let docs = vec![
            Document::new(0, "first chunk".to_string(), vec![]),
            Document::new(3, "fourth chunk".to_string(), vec![]),
        ];
        assert_eq!(format_context_for_prompt(&docs), "first chunk\n\nfourth chunk");
    }
}
