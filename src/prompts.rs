//! System prompt loader.
//!
//! Prompts live as Markdown files in the `prompts/` directory at the
//! project root, with built-in fallbacks so the binary works without it.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Fallback when the prompt file is missing. Restricts answers to the
/// retrieved comments and the conversation so far.
const DEFAULT_SENTIMENT_ANALYST: &str = "You analyze visitor comments about beaches in Lampung. \
Answer only from the comments provided in the message and the earlier conversation. \
When the comments do not contain the answer, say so instead of guessing.";

/// Available prompts.
#[derive(Debug, Clone, Copy)]
pub enum Prompt {
    /// Sentiment extraction chatbot over beach comments.
    SentimentAnalyst,
}

impl Prompt {
    /// Prompt file name (Markdown).
    pub fn filename(&self) -> &'static str {
        match self {
            Prompt::SentimentAnalyst => "sentiment_analyst.md",
        }
    }

    fn default_text(&self) -> &'static str {
        match self {
            Prompt::SentimentAnalyst => DEFAULT_SENTIMENT_ANALYST,
        }
    }

    /// Load the prompt from its file.
    pub fn load(&self) -> Result<String> {
        load_prompt(self.filename())
    }

    /// Load the prompt, falling back to the built-in text.
    pub fn load_or_default(&self) -> String {
        self.load().unwrap_or_else(|_| self.default_text().to_string())
    }
}

/// Load a prompt by file name.
pub fn load_prompt(filename: &str) -> Result<String> {
    let path = prompts_dir().join(filename);
    std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Cannot load prompt {}: {}", filename, e)))
}

/// Path to the prompts directory, searched relative to the working
/// directory and its parents.
pub fn prompts_dir() -> PathBuf {
    let candidates = [
        PathBuf::from("prompts"),
        PathBuf::from("../prompts"),
        PathBuf::from("../../prompts"),
    ];

    for path in candidates {
        if path.exists() {
            return path;
        }
    }

    PathBuf::from("prompts")
}
