//! The question-answering session.
//!
//! A session holds at most one loaded corpus (a video or a channel) and its
//! in-memory search index, and orchestrates ingest -> chunk -> embed ->
//! index -> answer. All state is per-session and in-memory; nothing is
//! persisted.
//!
//! Operations run strictly sequentially; a session is not meant to be
//! shared between callers without external locking.

use crate::chunking::SlidingWindowChunker;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::index::{ChunkIndex, ScoredChunk, DEFAULT_TOP_K};
use crate::rag::{Answerer, OpenAiAnswerer, NO_CONTEXT_ANSWER};
use crate::transcript::{AcquireError, TranscriptSource, YoutubeTranscriptSource};
use crate::video::{ChannelId, VideoId, VideoRef};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What a session currently holds.
enum SessionState {
    Empty,
    Loaded {
        video_ref: VideoRef,
        index: ChunkIndex,
    },
}

/// A stateful Q&A session over one loaded video or channel.
pub struct Session {
    source: Arc<dyn TranscriptSource>,
    embedder: Arc<dyn Embedder>,
    answerer: Arc<dyn Answerer>,
    chunker: SlidingWindowChunker,
    top_k: usize,
    state: SessionState,
}

/// Result of a successful ingest.
#[derive(Debug)]
pub struct IngestReport {
    /// What was loaded.
    pub video_ref: VideoRef,
    /// Total chunks in the fresh index.
    pub chunks_indexed: usize,
    /// Videos that contributed chunks (1 for single-video ingest).
    pub videos_loaded: usize,
    /// Videos skipped because their transcript could not be acquired.
    pub videos_failed: usize,
    /// Per-video acquisition failures (channel ingest only).
    pub failures: Vec<VideoFailure>,
}

/// One video's acquisition failure during channel ingest.
#[derive(Debug)]
pub struct VideoFailure {
    pub video_id: VideoId,
    pub error: AcquireError,
}

/// An answer with the chunks it was generated from.
#[derive(Debug, Clone)]
pub struct AskResponse {
    /// The generated answer. Never empty.
    pub answer: String,
    /// Chunks the answer was conditioned on; empty when nothing relevant
    /// was found.
    pub sources: Vec<ScoredChunk>,
}

impl Session {
    /// Create a session from custom components.
    pub fn with_components(
        source: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        answerer: Arc<dyn Answerer>,
        chunker: SlidingWindowChunker,
    ) -> Self {
        Self {
            source,
            embedder,
            answerer,
            chunker,
            top_k: DEFAULT_TOP_K,
            state: SessionState::Empty,
        }
    }

    /// Create a session with the default OpenAI-backed components.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.resolve_api_key()?;
        let prompts = crate::config::Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let chunker =
            SlidingWindowChunker::new(settings.chunking.chunk_size, settings.chunking.overlap)?;

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &api_key,
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let answerer = Arc::new(
            OpenAiAnswerer::new(
                &api_key,
                &settings.openai.chat_model,
                settings.openai.temperature,
            )
            .with_prompts(prompts.rag),
        );

        Ok(Self {
            source: Arc::new(YoutubeTranscriptSource::new()),
            embedder,
            answerer,
            chunker,
            top_k: settings.retrieval.top_k,
            state: SessionState::Empty,
        })
    }

    /// Set the number of chunks retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Load a single video into the session.
    ///
    /// A fresh index is built before the session state is touched, so any
    /// failure (bad URL, missing transcript, embedding error) leaves a
    /// previously loaded corpus exactly as it was.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn ingest(&mut self, url: &str) -> Result<IngestReport> {
        let video_id = VideoId::from_url(url)?;
        info!("Ingesting video {}", video_id);

        let transcript = self.source.acquire(&video_id).await?;
        let chunks = self.chunker.split(&transcript.full_text());
        if chunks.is_empty() {
            return Err(AcquireError::NoTranscript(video_id.to_string()).into());
        }

        let mut index = ChunkIndex::new(self.embedder.clone());
        let chunks_indexed = index.insert(chunks).await?;

        let video_ref = VideoRef::Video(video_id);
        info!("Loaded {} ({} chunks)", video_ref, chunks_indexed);
        self.state = SessionState::Loaded {
            video_ref: video_ref.clone(),
            index,
        };

        Ok(IngestReport {
            video_ref,
            chunks_indexed,
            videos_loaded: 1,
            videos_failed: 0,
            failures: Vec::new(),
        })
    }

    /// Load every video of a channel into the session.
    ///
    /// A single video's acquisition failure is recorded and the rest of the
    /// channel is still processed; the ingest succeeds as long as at least
    /// one video yields a usable transcript. Embedding failures abort the
    /// whole ingest (prior state preserved).
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn ingest_channel(&mut self, channel_id: &str, limit: usize) -> Result<IngestReport> {
        let channel = ChannelId::parse(channel_id)?;

        let listings = self.source.list_channel_videos(&channel, limit).await?;
        if listings.is_empty() {
            return Err(
                AcquireError::NotFound(format!("no videos found for channel {}", channel)).into(),
            );
        }
        info!("Found {} videos in channel {}", listings.len(), channel);

        let mut index = ChunkIndex::new(self.embedder.clone());
        let mut chunks_indexed = 0;
        let mut videos_loaded = 0;
        let mut failures = Vec::new();

        for listing in listings {
            match self.source.acquire(&listing.video_id).await {
                Ok(transcript) => {
                    let chunks = self.chunker.split(&transcript.full_text());
                    if chunks.is_empty() {
                        failures.push(VideoFailure {
                            error: AcquireError::NoTranscript(listing.video_id.to_string()),
                            video_id: listing.video_id,
                        });
                        continue;
                    }
                    chunks_indexed += index.insert(chunks).await?;
                    videos_loaded += 1;
                }
                Err(error) => {
                    warn!("Skipping video {}: {}", listing.video_id, error);
                    failures.push(VideoFailure {
                        video_id: listing.video_id,
                        error,
                    });
                }
            }
        }

        if videos_loaded == 0 {
            return Err(AcquireError::NoTranscript(format!(
                "no videos in channel {} had usable transcripts",
                channel
            ))
            .into());
        }

        let video_ref = VideoRef::Channel(channel);
        info!(
            "Loaded {} ({} videos, {} chunks, {} failed)",
            video_ref,
            videos_loaded,
            chunks_indexed,
            failures.len()
        );
        self.state = SessionState::Loaded {
            video_ref: video_ref.clone(),
            index,
        };

        Ok(IngestReport {
            video_ref,
            chunks_indexed,
            videos_loaded,
            videos_failed: failures.len(),
            failures,
        })
    }

    /// Answer a question from the loaded corpus.
    ///
    /// Requires a loaded corpus; when retrieval finds nothing relevant the
    /// answerer is not invoked and the response carries the fixed
    /// no-relevant-information answer with no sources.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SvarError::InvalidInput(
                "Please provide a question to ask.".to_string(),
            ));
        }

        let index = match &self.state {
            SessionState::Loaded { index, .. } => index,
            SessionState::Empty => return Err(SvarError::NoVideoLoaded),
        };

        let sources = index.query(question, self.top_k).await?;
        if sources.is_empty() {
            return Ok(AskResponse {
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let answer = self.answerer.answer(question, &sources).await?;
        Ok(AskResponse { answer, sources })
    }

    /// Drop the loaded corpus, if any. Idempotent.
    pub fn forget(&mut self) {
        if let SessionState::Loaded { video_ref, .. } = &self.state {
            info!("Forgetting {}", video_ref);
        }
        self.state = SessionState::Empty;
    }

    /// What the session currently has loaded.
    pub fn current_video(&self) -> Option<&VideoRef> {
        match &self.state {
            SessionState::Loaded { video_ref, .. } => Some(video_ref),
            SessionState::Empty => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, SessionState::Loaded { .. })
    }

    /// Number of chunks in the loaded index.
    pub fn chunk_count(&self) -> usize {
        match &self.state {
            SessionState::Loaded { index, .. } => index.len(),
            SessionState::Empty => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Transcript, TranscriptSegment, VideoListing};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const RICK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    /// Transcript source serving canned results per video id.
    struct StubSource {
        transcripts: HashMap<String, String>,
        disabled: Vec<String>,
        listings: Vec<VideoListing>,
    }

    impl StubSource {
        fn single(video_id: &str, text: &str) -> Self {
            let mut transcripts = HashMap::new();
            transcripts.insert(video_id.to_string(), text.to_string());
            Self {
                transcripts,
                disabled: Vec::new(),
                listings: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl TranscriptSource for StubSource {
        async fn acquire(
            &self,
            video_id: &VideoId,
        ) -> std::result::Result<Transcript, AcquireError> {
            if self.disabled.contains(&video_id.to_string()) {
                return Err(AcquireError::TranscriptsDisabled(video_id.to_string()));
            }
            match self.transcripts.get(video_id.as_str()) {
                Some(text) => Ok(Transcript::new(vec![TranscriptSegment::new(text.clone())])),
                None => Err(AcquireError::NoTranscript(video_id.to_string())),
            }
        }

        async fn list_channel_videos(
            &self,
            _channel: &ChannelId,
            limit: usize,
        ) -> Result<Vec<VideoListing>> {
            Ok(self.listings.iter().take(limit).cloned().collect())
        }
    }

    /// Constant-vector embedder with a switchable failure mode.
    struct StubEmbedder {
        fail: AtomicBool,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SvarError::Embedding("quota exceeded".to_string()));
            }
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SvarError::Embedding("quota exceeded".to_string()));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    /// Answerer returning a fixed string and counting invocations.
    struct StubAnswerer {
        reply: String,
        calls: AtomicUsize,
    }

    impl StubAnswerer {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Answerer for StubAnswerer {
        async fn answer(&self, _question: &str, _context: &[ScoredChunk]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn session_with(source: StubSource) -> (Session, Arc<StubEmbedder>, Arc<StubAnswerer>) {
        let embedder = Arc::new(StubEmbedder::new());
        let answerer = Arc::new(StubAnswerer::new("the answer"));
        let session = Session::with_components(
            Arc::new(source),
            embedder.clone(),
            answerer.clone(),
            SlidingWindowChunker::new(1000, 200).unwrap(),
        );
        (session, embedder, answerer)
    }

    #[tokio::test]
    async fn test_ask_before_ingest_returns_fixed_message() {
        let (session, _, answerer) = session_with(StubSource::single("dQw4w9WgXcQ", "hello"));

        let err = session.ask("what is said?").await.unwrap_err();
        assert!(matches!(err, SvarError::NoVideoLoaded));
        assert_eq!(
            err.to_string(),
            "Please add a video first before asking questions."
        );
        assert_eq!(answerer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_video_end_to_end() {
        let (mut session, _, _) = session_with(StubSource::single("dQw4w9WgXcQ", "hello world"));

        let report = session.ingest(RICK).await.unwrap();
        assert_eq!(report.chunks_indexed, 1);
        assert_eq!(report.videos_loaded, 1);
        assert_eq!(report.videos_failed, 0);
        assert!(session.is_loaded());
        assert_eq!(session.chunk_count(), 1);

        let response = session.ask("what is said?").await.unwrap();
        assert_eq!(response.answer, "the answer");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].chunk.content, "hello world");
    }

    #[tokio::test]
    async fn test_ingest_rejects_invalid_url_before_any_call() {
        let (mut session, _, _) = session_with(StubSource::single("dQw4w9WgXcQ", "hello"));

        let err = session.ingest("invalid-url").await.unwrap_err();
        assert!(matches!(err, SvarError::InvalidInput(_)));
        assert!(!session.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_ingest_preserves_loaded_state() {
        let mut source = StubSource::single("dQw4w9WgXcQ", "hello world");
        source.disabled.push("BBBBBBBBBBB".to_string());
        let (mut session, _, _) = session_with(source);

        session.ingest(RICK).await.unwrap();
        let loaded_ref = session.current_video().unwrap().clone();

        let err = session
            .ingest("https://youtu.be/BBBBBBBBBBB")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SvarError::Acquire(AcquireError::TranscriptsDisabled(_))
        ));

        // Old corpus and reference are untouched; asking still works.
        assert_eq!(session.current_video(), Some(&loaded_ref));
        let response = session.ask("still there?").await.unwrap();
        assert_eq!(response.answer, "the answer");
        assert_eq!(response.sources[0].chunk.content, "hello world");
    }

    #[tokio::test]
    async fn test_embedding_failure_preserves_loaded_state() {
        let mut source = StubSource::single("dQw4w9WgXcQ", "hello world");
        source
            .transcripts
            .insert("BBBBBBBBBBB".to_string(), "other text".to_string());
        let (mut session, embedder, _) = session_with(source);

        session.ingest(RICK).await.unwrap();
        embedder.fail.store(true, Ordering::SeqCst);

        let err = session
            .ingest("https://youtu.be/BBBBBBBBBBB")
            .await
            .unwrap_err();
        assert!(matches!(err, SvarError::Embedding(_)));

        embedder.fail.store(false, Ordering::SeqCst);
        assert_eq!(
            session.current_video(),
            Some(&VideoRef::Video(VideoId::from_url(RICK).unwrap()))
        );
        let response = session.ask("still there?").await.unwrap();
        assert_eq!(response.sources[0].chunk.content, "hello world");
    }

    #[tokio::test]
    async fn test_empty_transcript_is_an_ingest_failure() {
        let (mut session, _, _) = session_with(StubSource::single("dQw4w9WgXcQ", "   "));

        let err = session.ingest(RICK).await.unwrap_err();
        assert!(matches!(
            err,
            SvarError::Acquire(AcquireError::NoTranscript(_))
        ));
        assert!(!session.is_loaded());
    }

    #[tokio::test]
    async fn test_ask_with_blank_question_is_rejected() {
        let (mut session, _, _) = session_with(StubSource::single("dQw4w9WgXcQ", "hello"));
        session.ingest(RICK).await.unwrap();

        let err = session.ask("   ").await.unwrap_err();
        assert!(matches!(err, SvarError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_index_short_circuits_without_answerer() {
        let (mut session, embedder, answerer) =
            session_with(StubSource::single("dQw4w9WgXcQ", "hello"));

        // Force a loaded session over an empty index; retrieval then finds
        // nothing and the answerer must not run.
        session.state = SessionState::Loaded {
            video_ref: VideoRef::Video(VideoId::from_url(RICK).unwrap()),
            index: ChunkIndex::new(embedder),
        };

        let response = session.ask("anything?").await.unwrap();
        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert!(response.sources.is_empty());
        assert_eq!(answerer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_forget_is_idempotent() {
        let (mut session, _, _) = session_with(StubSource::single("dQw4w9WgXcQ", "hello"));
        session.ingest(RICK).await.unwrap();
        assert!(session.is_loaded());

        session.forget();
        assert!(!session.is_loaded());
        assert!(session.current_video().is_none());
        assert!(matches!(
            session.ask("anything?").await.unwrap_err(),
            SvarError::NoVideoLoaded
        ));

        // Forgetting an empty session is a no-op.
        session.forget();
        assert!(!session.is_loaded());
    }

    fn channel_source() -> StubSource {
        let mut source = StubSource::single("AAAAAAAAAAA", "alpha transcript text");
        source.disabled.push("BBBBBBBBBBB".to_string());
        source.listings = vec![
            VideoListing {
                video_id: VideoId::from_id("AAAAAAAAAAA").unwrap(),
                title: "Alpha".to_string(),
            },
            VideoListing {
                video_id: VideoId::from_id("BBBBBBBBBBB").unwrap(),
                title: "Beta".to_string(),
            },
            VideoListing {
                video_id: VideoId::from_id("CCCCCCCCCCC").unwrap(),
                title: "Gamma".to_string(),
            },
        ];
        source
    }

    #[tokio::test]
    async fn test_channel_ingest_tallies_failures_and_continues() {
        let (mut session, _, _) = session_with(channel_source());

        let report = session
            .ingest_channel("UC03sxjXYe4mSLqr5etxOXGA", 50)
            .await
            .unwrap();

        assert_eq!(report.videos_loaded, 1);
        assert_eq!(report.videos_failed, 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.chunks_indexed, 1);
        assert!(session.is_loaded());
        assert!(matches!(
            session.current_video(),
            Some(VideoRef::Channel(_))
        ));
    }

    #[tokio::test]
    async fn test_channel_ingest_fails_when_no_video_has_a_transcript() {
        let mut source = channel_source();
        source.transcripts.clear();
        let (mut session, _, _) = session_with(source);

        let err = session
            .ingest_channel("UC03sxjXYe4mSLqr5etxOXGA", 50)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SvarError::Acquire(AcquireError::NoTranscript(_))
        ));
        assert!(!session.is_loaded());
    }

    #[tokio::test]
    async fn test_channel_ingest_rejects_bad_channel_id() {
        let (mut session, _, _) = session_with(channel_source());

        let err = session.ingest_channel("not-a-channel", 50).await.unwrap_err();
        assert!(matches!(err, SvarError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_channel_ingest_respects_limit() {
        let (mut session, _, _) = session_with(channel_source());

        let report = session
            .ingest_channel("UC03sxjXYe4mSLqr5etxOXGA", 1)
            .await
            .unwrap();
        // Only the first listed video is considered.
        assert_eq!(report.videos_loaded, 1);
        assert_eq!(report.videos_failed, 0);
    }
}
