//! Character-count text splitter.

use crate::config::ChunkingSettings;
use crate::error::{Result, TubeQaError};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Splits text on a preferred separator and merges the pieces into chunks of
/// at most `chunk_size` characters, overlapping by up to `chunk_overlap`.
///
/// Pieces that are still too long are split again on spaces and, failing
/// that, on character boundaries. Lengths count Unicode scalar values.
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    separators: Vec<String>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterSplitter {
    /// Create a splitter from chunking settings.
    pub fn new(settings: &ChunkingSettings) -> Result<Self> {
        if settings.chunk_size == 0 {
            return Err(TubeQaError::Config("chunk_size must be positive".to_string()));
        }
        if settings.chunk_overlap > settings.chunk_size {
            return Err(TubeQaError::Config(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                settings.chunk_overlap, settings.chunk_size
            )));
        }

        let mut separators = vec![settings.separator.clone()];
        for fallback in [" ", ""] {
            if !separators.iter().any(|s| s == fallback) {
                separators.push(fallback.to_string());
            }
        }

        Ok(Self {
            separators,
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        })
    }

    /// Split text into chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chunks = self.split_with(text, &self.separators);
        debug!("Split {} chars into {} chunks", char_len(text), chunks.len());
        chunks
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in text.split(separator).filter(|s| !s.is_empty()) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }

        chunks
    }

    /// Greedily pack pieces into chunks, keeping a tail of each chunk as the
    /// head of the next.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joined = |current: &VecDeque<&str>| if current.is_empty() { 0 } else { separator_len };

            if total + len + joined(&current) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }
                if !current.is_empty() {
                    if let Some(chunk) = join_trimmed(&current, separator) {
                        chunks.push(chunk);
                    }
                    while total > self.chunk_overlap
                        || (total + len + joined(&current) > self.chunk_size && total > 0)
                    {
                        let dropped_separator = if current.len() > 1 { separator_len } else { 0 };
                        let Some(first) = current.pop_front() else {
                            break;
                        };
                        total = total.saturating_sub(char_len(first) + dropped_separator);
                    }
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = join_trimmed(&current, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_trimmed(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
