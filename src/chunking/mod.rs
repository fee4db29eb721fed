//! Transcript chunking for retrieval.
//!
//! Splits a transcript into bounded, overlapping windows so that context
//! around a cut point survives in at least one chunk.

mod character;

pub use character::CharacterSplitter;
