//! Conversation state: interview steps, transcript and accumulated answers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::diagnosis::DiagnosisReport;
use super::patient::{ProfileDraft, SymptomSelection};
use super::prediction::RankedLabel;
use super::triage::UrgencyTier;

/// Interview steps, in order. Transitions only move forward (or reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Start = 0,
    AskDemographics = 1,
    AskVitals = 2,
    AskLifestyle = 3,
    AskSymptoms = 4,
    AskDuration = 5,
    Analyze = 6,
    Complete = 7,
}

impl Step {
    /// Step number (0..=7).
    #[must_use]
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Following step; `Complete` has none.
    #[must_use]
    pub fn next(&self) -> Option<Step> {
        match self {
            Self::Start => Some(Self::AskDemographics),
            Self::AskDemographics => Some(Self::AskVitals),
            Self::AskVitals => Some(Self::AskLifestyle),
            Self::AskLifestyle => Some(Self::AskSymptoms),
            Self::AskSymptoms => Some(Self::AskDuration),
            Self::AskDuration => Some(Self::Analyze),
            Self::Analyze => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Whether the step waits for a user submission.
    #[must_use]
    pub fn takes_input(&self) -> bool {
        matches!(
            self,
            Self::AskDemographics
                | Self::AskVitals
                | Self::AskLifestyle
                | Self::AskSymptoms
                | Self::AskDuration
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::AskDemographics => "demographics",
            Self::AskVitals => "vitals",
            Self::AskLifestyle => "lifestyle",
            Self::AskSymptoms => "symptoms",
            Self::AskDuration => "duration",
            Self::Analyze => "analyze",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Recoverable rejection of a step submission. The message is user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum StepError {
    #[error("Gender must be Male, Female or Other (got '{0}').")]
    Gender(String),

    #[error("Age must be between 1 and 120 (got {0}).")]
    Age(i64),

    #[error("Height must be between 50 and 250 cm (got {0}).")]
    Height(i64),

    #[error("Weight must be between 20 and 200 kg (got {0}).")]
    Weight(i64),

    #[error("Unknown condition or habit '{0}'.")]
    RiskFactor(String),

    #[error("Unknown sleep band '{0}'.")]
    SleepBand(String),

    #[error("Please choose your average sleep.")]
    MissingSleepBand,

    #[error("Please select at least one symptom.")]
    NoSymptoms,

    #[error("Duration must be between 1 and 365 days (got {0}).")]
    Duration(i64),

    #[error("This answer belongs to the {submitted} step, but the interview is at {current}.")]
    WrongStep { current: Step, submitted: Step },

    #[error("A new consultation can only be started once the current one is complete.")]
    NotComplete,
}

/// Raw answers for one input step, as typed or picked by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepInput {
    Demographics { gender: String, age: i64 },
    Vitals { height_cm: i64, weight_kg: i64 },
    Lifestyle {
        risk_factors: Vec<String>,
        sleep: Option<String>,
    },
    Symptoms { symptoms: Vec<String> },
    Duration { days: i64 },
}

impl StepInput {
    /// Step this input answers.
    #[must_use]
    pub fn step(&self) -> Step {
        match self {
            Self::Demographics { .. } => Step::AskDemographics,
            Self::Vitals { .. } => Step::AskVitals,
            Self::Lifestyle { .. } => Step::AskLifestyle,
            Self::Symptoms { .. } => Step::AskSymptoms,
            Self::Duration { .. } => Step::AskDuration,
        }
    }
}

/// Something the user (or the hosting layer) does to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Re-evaluate the current step without submitting anything
    Refresh,
    /// Submit the current step's answers ("Next")
    Submit(StepInput),
    /// Start a new consultation from `Complete`
    Reset,
}

/// Observable outcome of a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// An assistant prompt for this step was appended
    Prompted(Step),
    /// The step's answers were accepted and a user turn appended
    Recorded(Step),
    /// The submission was rejected; state unchanged
    Rejected(StepError),
    /// Analysis finished (possibly degraded)
    Analyzed { tier: UrgencyTier, degraded: bool },
    /// Session returned to `Start`
    Reset,
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Assistant,
    User,
}

/// Content kind tag, for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    Prompt,
    Text,
    Diagnosis,
    Alternatives,
    Error,
}

/// Structured turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnContent {
    /// Assistant question opening a step
    Prompt { step: Step, text: String },
    /// Plain text (user answer summaries)
    Text(String),
    Diagnosis(Box<DiagnosisReport>),
    /// Secondary candidates above the visibility threshold
    Alternatives(Vec<RankedLabel>),
    Error(String),
}

impl TurnContent {
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Prompt { .. } => ContentKind::Prompt,
            Self::Text(_) => ContentKind::Text,
            Self::Diagnosis(_) => ContentKind::Diagnosis,
            Self::Alternatives(_) => ContentKind::Alternatives,
            Self::Error(_) => ContentKind::Error,
        }
    }
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl Turn {
    #[must_use]
    pub fn assistant(content: TurnContent) -> Self {
        Self {
            role: Role::Assistant,
            content,
            at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
            at: chrono::Utc::now(),
        }
    }
}

/// Everything one session owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Opaque authenticated user identifier (greeting only)
    pub user: String,
    pub step: Step,
    pub profile: ProfileDraft,
    pub selection: SymptomSelection,
    pub transcript: Vec<Turn>,
}

impl ConversationState {
    /// Fresh session at `Start` with an empty transcript.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            step: Step::Start,
            profile: ProfileDraft::default(),
            selection: SymptomSelection::default(),
            transcript: Vec::new(),
        }
    }

    /// Step whose prompt is the last transcript turn, if the tail is a prompt.
    #[must_use]
    pub fn last_prompt(&self) -> Option<Step> {
        match self.transcript.last().map(|t| &t.content) {
            Some(TurnContent::Prompt { step, .. }) => Some(*step),
            _ => None,
        }
    }

    /// Whether the current step's prompt has already been emitted.
    #[must_use]
    pub fn prompted(&self) -> bool {
        self.last_prompt() == Some(self.step)
    }

    /// Most recent diagnosis in the transcript.
    #[must_use]
    pub fn latest_diagnosis(&self) -> Option<&DiagnosisReport> {
        self.transcript.iter().rev().find_map(|t| match &t.content {
            TurnContent::Diagnosis(report) => Some(report.as_ref()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_linear() {
        let mut step = Step::Start;
        let mut seen = vec![step.index()];
        while let Some(next) = step.next() {
            assert!(next > step);
            step = next;
            seen.push(step.index());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_input_steps() {
        assert!(!Step::Start.takes_input());
        assert!(Step::AskSymptoms.takes_input());
        assert!(!Step::Analyze.takes_input());
        assert!(!Step::Complete.takes_input());
    }

    #[test]
    fn test_prompted_checks_transcript_tail() {
        let mut state = ConversationState::new("alice");
        assert!(!state.prompted());

        state.transcript.push(Turn::assistant(TurnContent::Prompt {
            step: Step::Start,
            text: "hello".to_string(),
        }));
        assert!(state.prompted());

        state.transcript.push(Turn::user("hi"));
        assert!(!state.prompted());
    }

    #[test]
    fn test_step_error_messages() {
        assert_eq!(
            StepError::NoSymptoms.to_string(),
            "Please select at least one symptom."
        );
        assert!(StepError::Age(0).to_string().contains("between 1 and 120"));
    }
}
