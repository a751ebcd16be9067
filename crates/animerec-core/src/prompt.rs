//! # Prompt Templates
//!
//! A template is plain text with two placeholders, `{context}` and
//! `{question}`. Literal braces are written doubled (`{{` and `}}`).
//! Templates are parsed once, so substituted text is never re-scanned for
//! placeholders.

use serde::Serialize;

use crate::error::{RecommenderError, Result};
use crate::types::SelectedContext;

/// The default recommendation prompt.
pub const ANIME_RECOMMENDATION_TEMPLATE: &str = "\
You are an expert anime recommender. Your job is to help users find the perfect anime based on their preferences.

Using the following context, provide a detailed and engaging response to the user's question.

For each question, suggest exactly three anime titles. For each recommendation, include:
1. The anime title.
2. A concise plot summary (2-3 sentences).
3. A clear explanation of why this anime matches the user's preferences.

Present your recommendations in a numbered list format for easy reading.

If you don't know the answer, respond honestly by saying you don't know. Do not fabricate any information.

Context:
{context}

User's question:
{question}

Your well-structured response:
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Context,
    Question,
}

/// A parsed prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Returns [`RecommenderError::InvalidTemplate`] for unknown or unclosed
    /// placeholders, stray closing braces, or when either placeholder is
    /// missing.
    pub fn new(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(RecommenderError::InvalidTemplate(format!(
                                    "unclosed placeholder {{{name}"
                                )));
                            }
                        }
                    }
                    let slot = match name.as_str() {
                        "context" => Segment::Context,
                        "question" => Segment::Question,
                        other => {
                            return Err(RecommenderError::InvalidTemplate(format!(
                                "unknown placeholder {{{other}}}"
                            )));
                        }
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(slot);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(RecommenderError::InvalidTemplate(
                        "single '}' encountered, use '}}' for a literal brace".into(),
                    ));
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        for (slot, name) in [(Segment::Context, "context"), (Segment::Question, "question")] {
            if !segments.contains(&slot) {
                return Err(RecommenderError::InvalidTemplate(format!(
                    "missing placeholder {{{name}}}"
                )));
            }
        }

        Ok(Self { segments })
    }

    /// The built-in anime recommendation template.
    #[must_use]
    pub fn anime() -> Self {
        Self::new(ANIME_RECOMMENDATION_TEMPLATE)
            .unwrap_or_else(|_| unreachable!("built-in template is well-formed"))
    }

    /// Substitutes the context and question.
    #[must_use]
    pub fn format(&self, context: &str, question: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Context => out.push_str(context),
                Segment::Question => out.push_str(question),
            }
        }
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::anime()
    }
}

/// A query with its selected context and the filled-in prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedPrompt {
    /// The user's query.
    pub query: String,
    /// The selected context.
    pub context: SelectedContext,
    /// The prompt to send to the generator.
    pub prompt: String,
}
