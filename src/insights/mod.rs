//! Insight prompts for an external AI layer.

pub mod prompt;

pub use prompt::{build_insight_prompt, build_question_prompt};
