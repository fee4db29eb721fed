//! Vector store abstraction for tubeqa.
//!
//! Each processed video gets its own index over its transcript chunks.

mod memory;

pub use memory::MemoryVectorStore;

use crate::embedding::Embedder;
use crate::error::{Result, TubeQaError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// A transcript chunk stored in the vector index.
#[derive(Debug, Clone)]
pub struct Document {
    /// Position of this chunk in the split sequence.
    pub order: usize,
    /// Text content of this chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

impl Document {
    /// Create a new document.
    pub fn new(order: usize, content: String, embedding: Vec<f32>) -> Self {
        Self {
            order,
            content,
            embedding,
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add documents to the index.
    async fn add_documents(&self, docs: Vec<Document>) -> Result<usize>;

    /// Search for the `limit` most similar documents.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
}

/// Embed chunks and load them into a fresh in-memory index.
#[instrument(skip_all, fields(chunks = chunks.len()))]
pub async fn build_index(chunks: Vec<String>, embedder: &dyn Embedder) -> Result<MemoryVectorStore> {
    if chunks.is_empty() {
        return Err(TubeQaError::VectorStoreUnavailable(
            "no chunks to index".to_string(),
        ));
    }

    let embeddings = embedder
        .embed_batch(&chunks)
        .await
        .map_err(|e| TubeQaError::VectorStoreUnavailable(e.to_string()))?;

    if embeddings.len() != chunks.len() {
        return Err(TubeQaError::VectorStoreUnavailable(format!(
            "embedded {} of {} chunks",
            embeddings.len(),
            chunks.len()
        )));
    }

    let documents: Vec<Document> = chunks
        .into_iter()
        .zip(embeddings)
        .enumerate()
        .map(|(order, (content, embedding))| Document::new(order, content, embedding))
        .collect();

    let store = MemoryVectorStore::new();
    let count = store.add_documents(documents).await?;
    debug!("Indexed {} chunks", count);

    Ok(store)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
