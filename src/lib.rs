//! tubeqa - Question answering over YouTube transcripts
//!
//! A small HTTP service that fetches a video's captions, indexes them, and
//! answers follow-up questions about the video with a hosted LLM.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `transcript` - Video URL parsing and caption retrieval
//! - `chunking` - Splitting transcripts into overlapping chunks
//! - `embedding` - Embedding generation
//! - `vector_store` - Per-video similarity index
//! - `rag` - Retrieval and the conversational QA chain
//! - `session` - Per-video sessions and the session cache
//! - `orchestrator` - Pipeline coordination
//! - `cli` - Command line and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use tubeqa::config::Settings;
//! use tubeqa::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(Settings::load()?)?;
//!
//!     let result = orchestrator
//!         .process_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     let answer = orchestrator
//!         .ask_question(&result.video_id, "What is the song about?")
//!         .await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod transcript;
pub mod vector_store;

pub use error::{Result, TubeQaError};
