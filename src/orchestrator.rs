//! Pipeline orchestrator for tubeqa.
//!
//! Coordinates transcript fetching, chunking, indexing and QA chain
//! construction, and routes questions to cached sessions.

use crate::chunking::CharacterSplitter;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, TubeQaError};
use crate::rag::{ChatModel, OpenAIChatModel, QaChain, Retriever};
use crate::session::{Session, SessionCache};
use crate::transcript::{extract_video_id, TranscriptSource, YoutubeTranscripts};
use crate::vector_store::build_index;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The main orchestrator for the tubeqa pipeline.
pub struct Orchestrator {
    transcripts: Arc<dyn TranscriptSource>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn ChatModel>,
    splitter: CharacterSplitter,
    prompts: Prompts,
    top_k: usize,
    sessions: Arc<SessionCache>,
}

impl Orchestrator {
    /// Create an orchestrator wired to the configured external services.
    ///
    /// Fails if the LLM API key is missing from the environment.
    pub fn new(settings: Settings) -> Result<Self> {
        let transcripts: Arc<dyn TranscriptSource> =
            Arc::new(YoutubeTranscripts::new(&settings.transcript)?);

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(
            &settings.embedding_endpoint(),
            &settings.embedding,
        )?);

        let llm: Arc<dyn ChatModel> =
            Arc::new(OpenAIChatModel::new(&settings.llm_endpoint(), &settings.llm)?);
        info!("Using {} via {}", settings.llm.model, settings.llm.api_base);

        Self::with_components(
            &settings,
            transcripts,
            embedder,
            llm,
            Arc::new(SessionCache::new()),
        )
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: &Settings,
        transcripts: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn ChatModel>,
        sessions: Arc<SessionCache>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self {
            transcripts,
            embedder,
            llm,
            splitter: CharacterSplitter::new(&settings.chunking)?,
            prompts,
            top_k: settings.retrieval.top_k,
            sessions,
        })
    }

    /// Get a reference to the session cache.
    pub fn sessions(&self) -> Arc<SessionCache> {
        self.sessions.clone()
    }

    /// Process a video: fetch its transcript, index it and cache a QA session.
    ///
    /// Already processed videos are returned without touching any service.
    #[instrument(skip(self))]
    pub async fn process_video(&self, video_url: &str) -> Result<ProcessResult> {
        let video_id = extract_video_id(video_url).ok_or_else(|| {
            TubeQaError::InvalidInput(format!("Invalid YouTube URL: {}", video_url))
        })?;

        let (_, built) = self
            .sessions
            .get_or_build(&video_id, || self.build_session(&video_id))
            .await?;

        if built {
            info!("Video {} processed and cached", video_id);
        } else {
            info!("Video {} is already processed, skipping", video_id);
        }

        Ok(ProcessResult {
            video_id,
            already_processed: !built,
        })
    }

    /// Ask a question about a processed video.
    #[instrument(skip(self, question))]
    pub async fn ask_question(&self, video_id: &str, question: &str) -> Result<String> {
        let session = self
            .sessions
            .get(video_id)
            .await
            .ok_or_else(|| TubeQaError::SessionNotFound(video_id.to_string()))?;

        info!("New question for {}", video_id);
        session.ask(question).await
    }

    async fn build_session(&self, video_id: &str) -> Result<Session> {
        info!("Processing new video ID: {}", video_id);

        let transcript = self.transcripts.fetch(video_id).await?;

        info!("Creating vector store");
        let chunks = self.splitter.split(&transcript);
        debug!("Transcript split into {} chunks", chunks.len());
        let store = build_index(chunks, self.embedder.as_ref()).await?;

        info!("Creating QA chain");
        let retriever =
            Retriever::new(Arc::new(store), self.embedder.clone()).with_top_k(self.top_k);
        let chain = QaChain::new(retriever, self.llm.clone(), self.prompts.clone()).await?;

        Ok(Session::new(chain))
    }
}

/// Result of processing a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Video ID parsed from the URL.
    pub video_id: String,
    /// Whether a cached session already existed.
    pub already_processed: bool,
}

impl ProcessResult {
    /// Human-readable status message.
    pub fn message(&self) -> &'static str {
        if self.already_processed {
            "Video already processed"
        } else {
            "Video processed successfully"
        }
    }
}
