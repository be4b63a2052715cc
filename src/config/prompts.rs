//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub summary: SummaryPrompts,
}

/// Prompts for answer generation over retrieved transcript chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that answers questions about a YouTube video using excerpts from its transcript.

Guidelines:
- Answer using only the provided transcript excerpts
- If the excerpts don't contain the answer, say so clearly instead of guessing
- Be concise but complete
- Quote short phrases from the transcript when they support the answer"#
                .to_string(),

            user: r#"Question: {{question}}

Relevant transcript excerpts:

{{context}}

Please answer the question based on the excerpts above."#
                .to_string(),
        }
    }
}

/// Prompts for map-reduce video summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub map_system: String,
    pub map_user: String,
    pub reduce_system: String,
    pub reduce_user: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            map_system: "You summarize excerpts of video transcripts. Keep every \
                         substantive point; drop filler, greetings, and sponsor reads."
                .to_string(),

            map_user: r#"Summarize this transcript excerpt in a short paragraph:

{{text}}"#
                .to_string(),

            reduce_system: "You combine partial summaries of a video transcript into \
                            one coherent summary. Merge overlapping points and keep \
                            the original order of topics."
                .to_string(),

            reduce_user: r#"Combine these partial summaries into a single concise summary of the whole video:

{{text}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from defaults, with optional per-file overrides from a
    /// custom directory (rag.toml, summary.toml).
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(dir);

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.rag.system.is_empty());
        assert!(prompts.rag.user.contains("{{question}}"));
        assert!(prompts.rag.user.contains("{{context}}"));
        assert!(prompts.summary.map_user.contains("{{text}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }
}
