//! Grounded prompt assembly.
//!
//! Pure and deterministic: no I/O, no clock. The retrieved postings are
//! rendered in their (already ranked) order under a fixed preamble that
//! establishes the assistant's role and the grounding constraint, and the
//! user's query is appended literally at the end.

use crate::document::JobPosting;
use crate::error::{RagError, Result};

/// Instructional preamble placed at the top of every prompt.
const PREAMBLE: &str = "You are an expert in human resources and data science.\n\
\n\
Here are several job posting descriptions selected as the closest matches to the question asked:";

/// Grounding instruction placed between the context and the query.
const GROUNDING: &str = "Using only the descriptions above, answer the question below.";

/// Delimiter between rendered posting blocks.
const DELIMITER: &str = "\n\n---\n\n";

/// Default maximum prompt size in characters.
pub const DEFAULT_MAX_CHARS: usize = 24_000;

/// Renders retrieved postings and a query into a single grounding prompt.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    max_chars: usize,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self { max_chars: DEFAULT_MAX_CHARS }
    }
}

impl PromptAssembler {
    /// Create an assembler with the given maximum prompt size in characters.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Render one posting as its four-field block.
    fn render_posting(posting: &JobPosting) -> String {
        format!(
            "Title: {}\nLocation: {}\nDescription: {}\nURL: {}",
            posting.title, posting.location, posting.description, posting.url
        )
    }

    /// Assemble the full prompt for `query` over `postings`.
    ///
    /// `prior_context` is an optional rendering of earlier conversation
    /// turns; the generation client itself is stateless, so any multi-turn
    /// context must be baked into the prompt here on every call.
    ///
    /// An empty `postings` slice still yields a well-formed prompt with an
    /// empty context section. Documents are never truncated: a prompt that
    /// would exceed the configured maximum is [`RagError::PromptTooLarge`].
    pub fn assemble(
        &self,
        query: &str,
        postings: &[JobPosting],
        prior_context: Option<&str>,
    ) -> Result<String> {
        let context =
            postings.iter().map(Self::render_posting).collect::<Vec<_>>().join(DELIMITER);

        let mut prompt = String::new();
        prompt.push_str(PREAMBLE);
        prompt.push_str("\n\n");
        if let Some(prior) = prior_context {
            prompt.push_str("Earlier conversation:\n");
            prompt.push_str(prior);
            prompt.push_str("\n\n");
        }
        prompt.push_str(&context);
        prompt.push_str("\n\n");
        prompt.push_str(GROUNDING);
        prompt.push_str("\n\nQuestion:\n");
        prompt.push_str(query);

        let size = prompt.chars().count();
        if size > self.max_chars {
            return Err(RagError::PromptTooLarge { size, limit: self.max_chars });
        }
        Ok(prompt)
    }
}
