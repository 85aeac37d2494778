//! Conversation engine: the interview state machine.
//!
//! `transition(state, action) -> (state, effects)` is the only way a session
//! changes. It owns no session data; callers keep the returned state.
//!
//! Prompt emission is idempotent: a step's prompt is appended only when the
//! transcript does not already end with that prompt, so re-evaluating a
//! state any number of times yields a single prompt turn.

use crate::domain::{
    check_range, parse_risk_factors, Action, ConversationState, DiagnosisReport, Effect, Gender,
    SleepBand, Step, StepError, StepInput, Turn, TurnContent, AGE_RANGE, DURATION_DAYS_RANGE,
    HEIGHT_CM_RANGE, WEIGHT_KG_RANGE,
};

use super::diagnosis::{AnalysisInput, Analyzer};

/// Assistant text for a step's prompt.
fn prompt_text(step: Step, user: &str) -> Option<String> {
    let text = match step {
        Step::Start => format!(
            "Hello {user}! I need to gather some basic details to understand your health context better. Ready?"
        ),
        Step::AskDemographics => "Let's start with the basics. What is your Gender and Age?".into(),
        Step::AskVitals => "Thanks. Could you share your Height and Weight?".into(),
        Step::AskLifestyle => "Do you have any existing conditions or habits (Smoking/Alcohol)? Also, how is your sleep?".into(),
        Step::AskSymptoms => "Profile updated. Now, what symptoms are you experiencing today?".into(),
        Step::AskDuration => "Understood. How many days have you had these symptoms?".into(),
        Step::Analyze | Step::Complete => return None,
    };
    Some(text)
}

/// Drives sessions through the interview.
pub struct ConversationEngine<A: Analyzer> {
    analyzer: A,
}

impl<A: Analyzer> ConversationEngine<A> {
    pub fn new(analyzer: A) -> Self {
        Self { analyzer }
    }

    #[must_use]
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Apply one action to a session state.
    ///
    /// Rejected submissions return the state unchanged together with an
    /// `Effect::Rejected` carrying the user-facing warning.
    #[must_use]
    pub fn transition(
        &self,
        state: ConversationState,
        action: Action,
    ) -> (ConversationState, Vec<Effect>) {
        let mut effects = Vec::new();

        let state = match action {
            Action::Refresh => self.settle(state, &mut effects),
            Action::Submit(input) => match self.accept(&state, input) {
                Ok(next) => {
                    effects.push(Effect::Recorded(state.step));
                    tracing::debug!("Step {} -> {}", state.step, next.step);
                    self.settle(next, &mut effects)
                }
                Err(e) => {
                    tracing::debug!("Step {} rejected input", state.step);
                    effects.push(Effect::Rejected(e));
                    state
                }
            },
            Action::Reset => {
                if state.step == Step::Complete {
                    effects.push(Effect::Reset);
                    ConversationState::new(state.user)
                } else {
                    effects.push(Effect::Rejected(StepError::NotComplete));
                    state
                }
            }
        };

        (state, effects)
    }

    /// Emit any pending prompt and run steps that need no input.
    fn settle(&self, mut state: ConversationState, effects: &mut Vec<Effect>) -> ConversationState {
        loop {
            match state.step {
                Step::Start => {
                    self.prompt(&mut state, effects);
                    state.step = Step::AskDemographics;
                }
                Step::Analyze => {
                    self.analyze(&mut state, effects);
                    state.step = Step::Complete;
                    return state;
                }
                Step::Complete => return state,
                _ => {
                    self.prompt(&mut state, effects);
                    return state;
                }
            }
        }
    }

    fn prompt(&self, state: &mut ConversationState, effects: &mut Vec<Effect>) {
        if state.prompted() {
            return;
        }
        if let Some(text) = prompt_text(state.step, &state.user) {
            state.transcript.push(Turn::assistant(TurnContent::Prompt {
                step: state.step,
                text,
            }));
            effects.push(Effect::Prompted(state.step));
        }
    }

    /// Validate a submission and build the advanced state.
    ///
    /// The user turn and the draft update are applied to the same copy, so
    /// either both land or neither does.
    fn accept(
        &self,
        current: &ConversationState,
        input: StepInput,
    ) -> Result<ConversationState, StepError> {
        if input.step() != current.step {
            return Err(StepError::WrongStep {
                current: current.step,
                submitted: input.step(),
            });
        }

        let mut next = current.clone();
        let summary = match input {
            StepInput::Demographics { gender, age } => {
                let gender: Gender = gender.parse()?;
                let age: u8 = check_range(age, &AGE_RANGE, StepError::Age)?;
                next.profile.gender = Some(gender);
                next.profile.age = Some(age);
                format!("I am a {age}-year-old {gender}.")
            }
            StepInput::Vitals {
                height_cm,
                weight_kg,
            } => {
                let height: u16 = check_range(height_cm, &HEIGHT_CM_RANGE, StepError::Height)?;
                let weight: u16 = check_range(weight_kg, &WEIGHT_KG_RANGE, StepError::Weight)?;
                next.profile.height_cm = Some(height);
                next.profile.weight_kg = Some(weight);
                format!("Height: {height}cm, Weight: {weight}kg.")
            }
            StepInput::Lifestyle {
                risk_factors,
                sleep,
            } => {
                let risks = parse_risk_factors(&risk_factors)?;
                let sleep: SleepBand = sleep.ok_or(StepError::MissingSleepBand)?.parse()?;
                let risk_text = if risks.is_empty() {
                    "None".to_string()
                } else {
                    risks
                        .iter()
                        .map(|r| r.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                next.profile.risk_factors = risks;
                next.profile.sleep_band = Some(sleep);
                format!("Risks: {risk_text}. Sleep: {sleep}.")
            }
            StepInput::Symptoms { symptoms } => {
                let catalog = self.analyzer.catalog();
                let mut ids: Vec<String> = Vec::new();
                for raw in &symptoms {
                    match catalog.resolve(raw) {
                        Some(id) if !ids.iter().any(|known| known == id) => ids.push(id.to_string()),
                        Some(_) => {}
                        None => tracing::debug!("Dropping unrecognised symptom entry"),
                    }
                }
                if ids.is_empty() {
                    return Err(StepError::NoSymptoms);
                }
                let labels: Vec<&str> = ids
                    .iter()
                    .filter_map(|id| catalog.label_for(id))
                    .collect();
                let text = format!("I am feeling: {}", labels.join(", "));
                next.selection.symptoms = ids;
                text
            }
            StepInput::Duration { days } => {
                let days: u16 = check_range(days, &DURATION_DAYS_RANGE, StepError::Duration)?;
                next.selection.duration_days = Some(days);
                format!("{days} days.")
            }
        };

        next.transcript.push(Turn::user(summary));
        if let Some(step) = next.step.next() {
            next.step = step;
        }
        Ok(next)
    }

    /// Run the analysis for a session sitting at `Analyze`.
    ///
    /// Failures fall back to the fail-closed Consult report so the session
    /// still reaches `Complete`.
    fn analyze(&self, state: &mut ConversationState, effects: &mut Vec<Effect>) {
        let outcome = match state.selection.duration_days {
            Some(duration_days) => self.analyzer.analyze(AnalysisInput {
                symptoms: &state.selection.symptoms,
                risk_factors: &state.profile.risk_factors,
                duration_days,
            }),
            None => Err(crate::ports::ClassifierError::Inference(
                "symptom duration was never recorded".into(),
            )),
        };

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Analysis degraded: {}", e);
                state.transcript.push(Turn::assistant(TurnContent::Error(format!(
                    "The analysis could not be completed ({e})."
                ))));
                DiagnosisReport::unavailable()
            }
        };

        let tier = report.tier();
        let degraded = report.degraded;
        let secondary = report.triage.secondary.clone();

        state
            .transcript
            .push(Turn::assistant(TurnContent::Diagnosis(Box::new(report))));
        if !secondary.is_empty() {
            state
                .transcript
                .push(Turn::assistant(TurnContent::Alternatives(secondary)));
        }
        effects.push(Effect::Analyzed { tier, degraded });
    }
}
