//! Answer generation over retrieved transcript chunks.

mod answerer;
pub mod context;
mod summarizer;

pub use answerer::{Answerer, OpenAiAnswerer};
pub use summarizer::Summarizer;

/// Returned when retrieval finds nothing relevant; the model is not called.
pub const NO_CONTEXT_ANSWER: &str = "I couldn't find relevant information in the video to answer your question. Try asking something else.";

/// Returned when the model produces an empty response. Answers are never
/// empty strings.
pub const FALLBACK_ANSWER: &str =
    "I couldn't generate a response for your question. Please try rephrasing it.";
