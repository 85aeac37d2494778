//! Per-step intake form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{Gender, RiskFactor, SleepBand, Step, StepInput, SymptomCatalog};
use crate::tui::styles::MedicalTheme;

/// Most symptoms listed at once under the filter.
const VISIBLE_SYMPTOMS: usize = 8;

/// One input widget.
#[derive(Debug, Clone)]
pub enum FormField {
    /// Cycle with ←/→
    Choice {
        label: &'static str,
        options: Vec<String>,
        index: usize,
    },
    /// Digits only
    Number {
        label: &'static str,
        hint: &'static str,
        value: String,
    },
    /// Move with ←/→, toggle with Space
    Toggles {
        label: &'static str,
        options: Vec<String>,
        checked: Vec<bool>,
        cursor: usize,
    },
    /// Type to filter, ←/→ to move, Space to pick
    Symptoms {
        query: String,
        cursor: usize,
        chosen: Vec<String>,
    },
}

impl FormField {
    fn label(&self) -> &'static str {
        match self {
            Self::Choice { label, .. } | Self::Number { label, .. } | Self::Toggles { label, .. } => {
                *label
            }
            Self::Symptoms { .. } => "Symptoms",
        }
    }

    fn number(label: &'static str, hint: &'static str, default: &str) -> Self {
        Self::Number {
            label,
            hint,
            value: default.to_string(),
        }
    }
}

/// Symptoms matching a filter query, as (id, label) in catalog order.
#[must_use]
pub fn filter_symptoms<'c>(catalog: &'c SymptomCatalog, query: &str) -> Vec<(&'c str, &'c str)> {
    let needle = query.trim().to_lowercase();
    catalog
        .symptoms()
        .iter()
        .filter(|s| {
            needle.is_empty()
                || s.label.to_lowercase().contains(&needle)
                || s.id.contains(&needle.replace(' ', "_"))
        })
        .map(|s| (s.id.as_str(), s.label.as_str()))
        .collect()
}

/// Form state for the step currently waiting on input.
pub struct IntakeForm {
    pub step: Step,
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl IntakeForm {
    /// Fresh form for a step, pre-filled with the usual defaults.
    #[must_use]
    pub fn for_step(step: Step) -> Self {
        let fields = match step {
            Step::AskDemographics => vec![
                FormField::Choice {
                    label: "Gender",
                    options: Gender::ALL.iter().map(ToString::to_string).collect(),
                    index: 0,
                },
                FormField::number("Age", "years (1-120)", "25"),
            ],
            Step::AskVitals => vec![
                FormField::number("Height", "cm (50-250)", "170"),
                FormField::number("Weight", "kg (20-200)", "70"),
            ],
            Step::AskLifestyle => vec![
                FormField::Toggles {
                    label: "Conditions & habits",
                    options: RiskFactor::ALL.iter().map(|r| r.label().to_string()).collect(),
                    checked: vec![false; RiskFactor::ALL.len()],
                    cursor: 0,
                },
                FormField::Choice {
                    label: "Average sleep",
                    options: SleepBand::ALL.iter().map(|s| s.label().to_string()).collect(),
                    index: 2,
                },
            ],
            Step::AskSymptoms => vec![FormField::Symptoms {
                query: String::new(),
                cursor: 0,
                chosen: Vec::new(),
            }],
            Step::AskDuration => vec![FormField::number("Duration", "days (1-365)", "1")],
            Step::Start | Step::Analyze | Step::Complete => Vec::new(),
        };

        Self {
            step,
            fields,
            selected_field: 0,
            error_message: None,
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.selected_field = (self.selected_field + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// ←/→ on the focused field.
    pub fn shift(&mut self, forward: bool, catalog: &SymptomCatalog) {
        let Some(field) = self.fields.get_mut(self.selected_field) else {
            return;
        };
        let advance = |pos: usize, len: usize| -> usize {
            if len == 0 {
                0
            } else if forward {
                (pos + 1) % len
            } else {
                (pos + len - 1) % len
            }
        };
        match field {
            FormField::Choice { options, index, .. } => *index = advance(*index, options.len()),
            FormField::Toggles { options, cursor, .. } => *cursor = advance(*cursor, options.len()),
            FormField::Symptoms { query, cursor, .. } => {
                let len = filter_symptoms(catalog, query).len();
                *cursor = advance(*cursor, len);
            }
            FormField::Number { .. } => {}
        }
    }

    /// Space on the focused field.
    pub fn toggle(&mut self, catalog: &SymptomCatalog) {
        let Some(field) = self.fields.get_mut(self.selected_field) else {
            return;
        };
        match field {
            FormField::Toggles {
                checked, cursor, ..
            } => {
                if let Some(flag) = checked.get_mut(*cursor) {
                    *flag = !*flag;
                }
            }
            FormField::Symptoms {
                query,
                cursor,
                chosen,
            } => {
                let matches = filter_symptoms(catalog, query);
                if let Some((id, _)) = matches.get(*cursor) {
                    if let Some(pos) = chosen.iter().position(|c| c == id) {
                        chosen.remove(pos);
                    } else {
                        chosen.push((*id).to_string());
                    }
                }
            }
            FormField::Choice { .. } | FormField::Number { .. } => {}
        }
        self.error_message = None;
    }

    pub fn input_char(&mut self, c: char) {
        let Some(field) = self.fields.get_mut(self.selected_field) else {
            return;
        };
        match field {
            FormField::Number { value, .. } if c.is_ascii_digit() => value.push(c),
            FormField::Symptoms { query, cursor, .. } if c.is_alphanumeric() || c == '_' => {
                query.push(c);
                *cursor = 0;
            }
            _ => return,
        }
        self.error_message = None;
    }

    pub fn delete_char(&mut self) {
        match self.fields.get_mut(self.selected_field) {
            Some(FormField::Number { value, .. }) => {
                value.pop();
            }
            Some(FormField::Symptoms { query, cursor, .. }) => {
                query.pop();
                *cursor = 0;
            }
            _ => {}
        }
    }

    /// Build the step submission. Only number parsing is checked here; the
    /// interview validates ranges.
    ///
    /// # Errors
    /// Returns a message naming the field that is not a number.
    pub fn to_step_input(&self) -> Result<StepInput, String> {
        let number = |i: usize| -> Result<i64, String> {
            match self.fields.get(i) {
                Some(FormField::Number { label, value, .. }) => value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("{label}: Invalid number")),
                _ => Err("Form is out of sync with the interview".into()),
            }
        };
        let choice = |i: usize| -> Option<String> {
            match self.fields.get(i) {
                Some(FormField::Choice { options, index, .. }) => options.get(*index).cloned(),
                _ => None,
            }
        };

        match self.step {
            Step::AskDemographics => Ok(StepInput::Demographics {
                gender: choice(0).unwrap_or_default(),
                age: number(1)?,
            }),
            Step::AskVitals => Ok(StepInput::Vitals {
                height_cm: number(0)?,
                weight_kg: number(1)?,
            }),
            Step::AskLifestyle => {
                let risk_factors = match self.fields.first() {
                    Some(FormField::Toggles {
                        options, checked, ..
                    }) => options
                        .iter()
                        .zip(checked)
                        .filter(|(_, on)| **on)
                        .map(|(o, _)| o.clone())
                        .collect(),
                    _ => Vec::new(),
                };
                Ok(StepInput::Lifestyle {
                    risk_factors,
                    sleep: choice(1),
                })
            }
            Step::AskSymptoms => match self.fields.first() {
                Some(FormField::Symptoms { chosen, .. }) => Ok(StepInput::Symptoms {
                    symptoms: chosen.clone(),
                }),
                _ => Err("Form is out of sync with the interview".into()),
            },
            Step::AskDuration => Ok(StepInput::Duration { days: number(0)? }),
            Step::Start | Step::Analyze | Step::Complete => {
                Err("Nothing to submit at this point".into())
            }
        }
    }

    /// Wipe typed values once they have been submitted.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            match field {
                FormField::Number { value, .. } => value.zeroize(),
                FormField::Symptoms { query, chosen, .. } => {
                    query.zeroize();
                    for id in chosen.iter_mut() {
                        id.zeroize();
                    }
                    chosen.clear();
                }
                FormField::Toggles { checked, .. } => checked.iter_mut().for_each(|c| *c = false),
                FormField::Choice { .. } => {}
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }
}

/// Render the form for the current step.
pub fn render_intake(f: &mut Frame, area: Rect, form: &IntakeForm, catalog: &SymptomCatalog) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    let constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|field| match field {
            FormField::Symptoms { .. } => Constraint::Min(0),
            FormField::Toggles { .. } => Constraint::Length(4),
            _ => Constraint::Length(3),
        })
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(chunks[0]);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.selected_field;
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", field.label()),
                if focused {
                    MedicalTheme::focused()
                } else {
                    MedicalTheme::text_secondary()
                },
            ))
            .borders(Borders::ALL)
            .border_style(if focused {
                MedicalTheme::border_focused()
            } else {
                MedicalTheme::border()
            });

        let body = field_lines(field, focused, catalog);
        f.render_widget(
            Paragraph::new(body).block(block).wrap(Wrap { trim: false }),
            rows[i],
        );
    }

    render_intake_footer(f, chunks[1], form);
}

fn field_lines<'a>(field: &'a FormField, focused: bool, catalog: &'a SymptomCatalog) -> Vec<Line<'a>> {
    match field {
        FormField::Choice { options, index, .. } => {
            let spans = options
                .iter()
                .enumerate()
                .flat_map(|(i, o)| {
                    let style = if i == *index {
                        MedicalTheme::selected()
                    } else {
                        MedicalTheme::text_muted()
                    };
                    [Span::styled(format!(" {o} "), style), Span::raw(" ")]
                })
                .collect::<Vec<_>>();
            vec![Line::from(spans)]
        }
        FormField::Number { hint, value, .. } => {
            let mut spans = vec![Span::raw(" ")];
            if value.is_empty() {
                spans.push(Span::styled(*hint, MedicalTheme::text_muted()));
            } else {
                spans.push(Span::styled(value.as_str(), MedicalTheme::text()));
            }
            if focused {
                spans.push(Span::styled("▌", MedicalTheme::cursor()));
            }
            vec![Line::from(spans)]
        }
        FormField::Toggles {
            options,
            checked,
            cursor,
            ..
        } => {
            let spans = options
                .iter()
                .zip(checked)
                .enumerate()
                .flat_map(|(i, (o, on))| {
                    let mark = if *on { "[x]" } else { "[ ]" };
                    let style = if focused && i == *cursor {
                        MedicalTheme::focused()
                    } else if *on {
                        MedicalTheme::text()
                    } else {
                        MedicalTheme::text_muted()
                    };
                    [Span::styled(format!("{mark} {o}"), style), Span::raw("  ")]
                })
                .collect::<Vec<_>>();
            vec![Line::from(spans)]
        }
        FormField::Symptoms {
            query,
            cursor,
            chosen,
        } => {
            let picked: Vec<&str> = chosen
                .iter()
                .filter_map(|id| catalog.label_for(id))
                .collect();
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(" Filter: ", MedicalTheme::text_secondary()),
                    Span::styled(query.as_str(), MedicalTheme::text()),
                    Span::styled(if focused { "▌" } else { "" }, MedicalTheme::cursor()),
                ]),
                Line::from(vec![
                    Span::styled(" Selected: ", MedicalTheme::text_secondary()),
                    Span::styled(
                        if picked.is_empty() {
                            "none".to_string()
                        } else {
                            picked.join(", ")
                        },
                        MedicalTheme::chosen(),
                    ),
                ]),
            ];

            let matches = filter_symptoms(catalog, query);
            let start = cursor.saturating_sub(VISIBLE_SYMPTOMS - 1);
            for (i, (id, label)) in matches.iter().enumerate().skip(start).take(VISIBLE_SYMPTOMS) {
                let on = chosen.iter().any(|c| c == id);
                let style = if i == *cursor {
                    MedicalTheme::selected()
                } else if on {
                    MedicalTheme::text()
                } else {
                    MedicalTheme::text_muted()
                };
                let mark = if on { "[x]" } else { "[ ]" };
                lines.push(Line::from(Span::styled(format!("  {mark} {label}"), style)));
            }
            lines
        }
    }
}

fn render_intake_footer(f: &mut Frame, area: Rect, form: &IntakeForm) {
    let content = if let Some(err) = &form.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::caution().add_modifier(Modifier::BOLD)),
            Span::styled(err.as_str(), MedicalTheme::caution()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[Tab/↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Field ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Choose ", MedicalTheme::key_desc()),
            Span::styled("[Space] ", MedicalTheme::key_hint()),
            Span::styled("Toggle ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Next ", MedicalTheme::key_desc()),
            Span::styled("[Ctrl+Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SymptomCatalog {
        SymptomCatalog::from_identifiers(["itching", "skin_rash", "chills"]).expect("Should build")
    }

    #[test]
    fn test_demographics_defaults() {
        let form = IntakeForm::for_step(Step::AskDemographics);
        assert_eq!(
            form.to_step_input().expect("Should build"),
            StepInput::Demographics {
                gender: "Male".into(),
                age: 25
            }
        );
    }

    #[test]
    fn test_number_field_rejects_blank() {
        let mut form = IntakeForm::for_step(Step::AskDuration);
        form.delete_char();
        let err = form.to_step_input().unwrap_err();
        assert!(err.contains("Duration"));
    }

    #[test]
    fn test_lifestyle_toggles_and_sleep() {
        let catalog = catalog();
        let mut form = IntakeForm::for_step(Step::AskLifestyle);
        form.shift(true, &catalog);
        form.toggle(&catalog); // Hypertension
        form.next_field();
        form.shift(false, &catalog); // 5-7 hrs

        assert_eq!(
            form.to_step_input().expect("Should build"),
            StepInput::Lifestyle {
                risk_factors: vec!["Hypertension".into()],
                sleep: Some("5-7 hrs".into()),
            }
        );
    }

    #[test]
    fn test_symptom_filter_and_pick() {
        let catalog = catalog();
        let mut form = IntakeForm::for_step(Step::AskSymptoms);
        for c in "rash".chars() {
            form.input_char(c);
        }
        form.toggle(&catalog);

        assert_eq!(
            form.to_step_input().expect("Should build"),
            StepInput::Symptoms {
                symptoms: vec!["skin_rash".into()]
            }
        );

        form.clear_sensitive();
        assert_eq!(
            form.to_step_input().expect("Should build"),
            StepInput::Symptoms {
                symptoms: Vec::new()
            }
        );
    }

    #[test]
    fn test_filter_matches_labels_and_ids() {
        let catalog = catalog();
        assert_eq!(filter_symptoms(&catalog, "").len(), 3);
        assert_eq!(filter_symptoms(&catalog, "Skin R"), vec![("skin_rash", "Skin Rash")]);
        assert_eq!(filter_symptoms(&catalog, "skin_r").len(), 1);
    }
}
