//! Tutor feedback on single diagram elements.

use serde::Deserialize;

use crate::score::Score;

/// Origin of a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum FeedbackType {
    /// Written by a tutor from scratch.
    #[default]
    Manual,
    /// An automatic suggestion the tutor edited before submitting.
    AutomaticAdapted,
    /// An automatic suggestion the tutor accepted unchanged.
    Automatic,
}

/// Credits and an optional comment a tutor attached to an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    credits: f64,
    feedback_type: FeedbackType,
    text: Option<String>,
}

impl Feedback {
    /// Creates manual feedback without a comment.
    pub fn manual(credits: f64) -> Self {
        Self::new(credits, FeedbackType::Manual, None)
    }

    /// Creates feedback of the given type.
    pub fn new(credits: f64, feedback_type: FeedbackType, text: Option<String>) -> Self {
        Self {
            credits,
            feedback_type,
            text,
        }
    }

    /// Attaches a comment.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn credits(&self) -> f64 {
        self.credits
    }

    pub fn feedback_type(&self) -> FeedbackType {
        self.feedback_type
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Converts the feedback into a score.
    ///
    /// Feedback a tutor wrote or edited counts with full confidence;
    /// suggestions accepted unchanged count with `automatic_confidence`.
    pub fn to_score(&self, automatic_confidence: f64) -> Score {
        let confidence = match self.feedback_type {
            FeedbackType::Manual | FeedbackType::AutomaticAdapted => 1.0,
            FeedbackType::Automatic => automatic_confidence,
        };
        Score::new(self.credits, confidence)
    }
}
