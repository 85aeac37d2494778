//! Patient profile and symptom selection collected during the interview.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::conversation::StepError;

/// Accepted age in years.
pub const AGE_RANGE: RangeInclusive<i64> = 1..=120;

/// Accepted height in centimetres.
pub const HEIGHT_CM_RANGE: RangeInclusive<i64> = 50..=250;

/// Accepted weight in kilograms.
pub const WEIGHT_KG_RANGE: RangeInclusive<i64> = 20..=200;

/// Accepted symptom duration in days.
pub const DURATION_DAYS_RANGE: RangeInclusive<i64> = 1..=365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for Gender {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(StepError::Gender(s.to_string())),
        }
    }
}

/// Pre-existing conditions and habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskFactor {
    Diabetes,
    Hypertension,
    Asthma,
    HeartCondition,
    Smoker,
    AlcoholConsumer,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 6] = [
        RiskFactor::Diabetes,
        RiskFactor::Hypertension,
        RiskFactor::Asthma,
        RiskFactor::HeartCondition,
        RiskFactor::Smoker,
        RiskFactor::AlcoholConsumer,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::Hypertension => "Hypertension",
            Self::Asthma => "Asthma",
            Self::HeartCondition => "Heart Condition",
            Self::Smoker => "Smoker",
            Self::AlcoholConsumer => "Alcohol Consumer",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskFactor {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "diabetes" => Ok(Self::Diabetes),
            "hypertension" => Ok(Self::Hypertension),
            "asthma" => Ok(Self::Asthma),
            "heartcondition" => Ok(Self::HeartCondition),
            "smoker" => Ok(Self::Smoker),
            "alcoholconsumer" => Ok(Self::AlcoholConsumer),
            _ => Err(StepError::RiskFactor(s.to_string())),
        }
    }
}

/// Parse risk factor selections; the literal "None" (or nothing) is the empty set.
///
/// # Errors
/// Returns `StepError::RiskFactor` for an unrecognised entry.
pub fn parse_risk_factors<S: AsRef<str>>(raw: &[S]) -> Result<BTreeSet<RiskFactor>, StepError> {
    let mut out = BTreeSet::new();
    for entry in raw {
        let entry = entry.as_ref();
        if entry.trim().eq_ignore_ascii_case("none") || entry.trim().is_empty() {
            continue;
        }
        out.insert(entry.parse()?);
    }
    Ok(out)
}

/// Average nightly sleep, in ordered bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SleepBand {
    UnderFive,
    FiveToSeven,
    SevenToNine,
    OverNine,
}

impl SleepBand {
    pub const ALL: [SleepBand; 4] = [
        SleepBand::UnderFive,
        SleepBand::FiveToSeven,
        SleepBand::SevenToNine,
        SleepBand::OverNine,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnderFive => "< 5 hrs",
            Self::FiveToSeven => "5-7 hrs",
            Self::SevenToNine => "7-9 hrs",
            Self::OverNine => "> 9 hrs",
        }
    }
}

impl Default for SleepBand {
    fn default() -> Self {
        Self::SevenToNine
    }
}

impl fmt::Display for SleepBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SleepBand {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_ascii_lowercase().as_str() {
            "<5hrs" | "<5" => Ok(Self::UnderFive),
            "5-7hrs" | "5-7" => Ok(Self::FiveToSeven),
            "7-9hrs" | "7-9" => Ok(Self::SevenToNine),
            ">9hrs" | ">9" => Ok(Self::OverNine),
            _ => Err(StepError::SleepBand(s.to_string())),
        }
    }
}

/// Validate an integer against an inclusive range, mapping failure through `err`.
pub(crate) fn check_range<T>(
    value: i64,
    range: &RangeInclusive<i64>,
    err: impl FnOnce(i64) -> StepError,
) -> Result<T, StepError>
where
    T: TryFrom<i64>,
{
    if !range.contains(&value) {
        return Err(err(value));
    }
    T::try_from(value).map_err(|_| err(value))
}

/// Demographic and lifestyle context for one consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u8,
    pub gender: Gender,
    pub height_cm: u16,
    pub weight_kg: u16,
    pub risk_factors: BTreeSet<RiskFactor>,
    pub sleep_band: SleepBand,
}

/// Profile fields accumulated step by step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub height_cm: Option<u16>,
    pub weight_kg: Option<u16>,
    pub risk_factors: BTreeSet<RiskFactor>,
    pub sleep_band: Option<SleepBand>,
}

impl ProfileDraft {
    /// Freeze the draft once every required field is present.
    #[must_use]
    pub fn complete(&self) -> Option<PatientProfile> {
        Some(PatientProfile {
            age: self.age?,
            gender: self.gender?,
            height_cm: self.height_cm?,
            weight_kg: self.weight_kg?,
            risk_factors: self.risk_factors.clone(),
            sleep_band: self.sleep_band?,
        })
    }
}

/// Selected symptoms (catalog identifiers) and how long they have lasted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomSelection {
    pub symptoms: Vec<String>,
    pub duration_days: Option<u16>,
}

impl SymptomSelection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parsing() {
        assert_eq!("male".parse::<Gender>().expect("Should parse"), Gender::Male);
        assert_eq!(" Female ".parse::<Gender>().expect("Should parse"), Gender::Female);
        assert!(matches!("robot".parse::<Gender>(), Err(StepError::Gender(_))));
    }

    #[test]
    fn test_risk_factor_parsing() {
        assert_eq!(
            "Heart Condition".parse::<RiskFactor>().expect("Should parse"),
            RiskFactor::HeartCondition
        );
        assert_eq!(
            "alcohol_consumer".parse::<RiskFactor>().expect("Should parse"),
            RiskFactor::AlcoholConsumer
        );
        assert!("gills".parse::<RiskFactor>().is_err());
    }

    #[test]
    fn test_none_means_no_risk_factors() {
        let parsed = parse_risk_factors(&["None"]).expect("Should parse");
        assert!(parsed.is_empty());

        let parsed = parse_risk_factors(&["Smoker", "Diabetes", "Smoker"]).expect("Should parse");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_sleep_band_labels_roundtrip() {
        for band in SleepBand::ALL {
            assert_eq!(band.label().parse::<SleepBand>().expect("Should parse"), band);
        }
        assert!(SleepBand::UnderFive < SleepBand::OverNine);
    }

    #[test]
    fn test_check_range() {
        let ok: Result<u8, _> = check_range(30, &AGE_RANGE, StepError::Age);
        assert_eq!(ok.expect("Should accept"), 30);

        let low: Result<u8, _> = check_range(0, &AGE_RANGE, StepError::Age);
        assert!(matches!(low, Err(StepError::Age(0))));

        let high: Result<u8, _> = check_range(121, &AGE_RANGE, StepError::Age);
        assert!(matches!(high, Err(StepError::Age(121))));
    }

    #[test]
    fn test_draft_completion() {
        let mut draft = ProfileDraft::default();
        assert!(draft.complete().is_none());

        draft.age = Some(30);
        draft.gender = Some(Gender::Male);
        draft.height_cm = Some(175);
        draft.weight_kg = Some(70);
        draft.sleep_band = Some(SleepBand::SevenToNine);

        let profile = draft.complete().expect("Should complete");
        assert_eq!(profile.height_cm, 175);
        assert_eq!(profile.sleep_band, SleepBand::SevenToNine);
    }
}
