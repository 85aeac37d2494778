//! Transcript view.

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{DiagnosisReport, RankedLabel, Role, Turn, TurnContent};
use crate::tui::styles::MedicalTheme;

fn diagnosis_lines(report: &DiagnosisReport) -> Vec<Line<'static>> {
    let tier_style = MedicalTheme::tier(report.tier());
    let mut lines = vec![
        Line::from(vec![
            Span::styled("  Diagnosis  ", MedicalTheme::title()),
            Span::styled(
                format!("{:.1}% Match", report.confidence() * 100.0),
                tier_style,
            ),
        ]),
        Line::from(Span::styled(
            format!("  {}", report.disease()),
            tier_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  {}", report.description),
            MedicalTheme::text_secondary(),
        )),
        Line::from(Span::styled("  Actions:", MedicalTheme::subtitle())),
    ];

    lines.extend(
        report
            .precautions
            .iter()
            .map(|p| Line::from(Span::styled(format!("    • {p}"), MedicalTheme::text()))),
    );

    let rationale = &report.triage.rationale;
    lines.push(Line::from(vec![
        Span::styled("  Advice: ", MedicalTheme::subtitle()),
        Span::styled(format!("[{}]", report.tier()), MedicalTheme::tier_badge(report.tier())),
        Span::raw(" "),
        Span::styled(rationale.headline().to_string(), MedicalTheme::title()),
    ]));
    lines.push(Line::from(Span::styled(
        format!("  {}", rationale.advice()),
        MedicalTheme::text_secondary(),
    )));
    lines
}

fn alternatives_line(alternatives: &[RankedLabel]) -> Line<'static> {
    let listed: Vec<String> = alternatives.iter().map(ToString::to_string).collect();
    Line::from(vec![
        Span::styled("  Also considered: ", MedicalTheme::subtitle()),
        Span::styled(listed.join(", "), MedicalTheme::text()),
    ])
}

/// Lines for one transcript turn.
#[must_use]
pub fn turn_lines(turn: &Turn) -> Vec<Line<'static>> {
    let speaker = match turn.role {
        Role::Assistant => "MediChat",
        Role::User => "You",
    };
    let header = Line::from(vec![
        Span::styled(speaker.to_string(), MedicalTheme::speaker(turn.role)),
        Span::styled(
            format!("  {}", turn.at.format("%H:%M")),
            MedicalTheme::text_muted(),
        ),
    ]);

    let mut lines = vec![header];
    match &turn.content {
        TurnContent::Prompt { text, .. } | TurnContent::Text(text) => {
            lines.push(Line::from(Span::styled(format!("  {text}"), MedicalTheme::text())));
        }
        TurnContent::Diagnosis(report) => lines.extend(diagnosis_lines(report)),
        TurnContent::Alternatives(alternatives) => lines.push(alternatives_line(alternatives)),
        TurnContent::Error(message) => {
            lines.push(Line::from(Span::styled(
                format!("  {message}"),
                MedicalTheme::alert(),
            )));
        }
    }
    lines.push(Line::raw(""));
    lines
}

/// Render the transcript, keeping the newest turns in view.
pub fn render_chat(f: &mut Frame, area: Rect, transcript: &[Turn], title: &str) {
    let lines: Vec<Line> = transcript.iter().flat_map(turn_lines).collect();

    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2).max(1);
    let rows: u16 = lines
        .iter()
        .map(|l| {
            let width = u16::try_from(l.width()).unwrap_or(u16::MAX);
            width.div_ceil(inner_width).max(1)
        })
        .fold(0u16, u16::saturating_add);
    let scroll = rows.saturating_sub(inner_height);

    let block = Block::default()
        .title(Span::styled(format!(" {title} "), MedicalTheme::title()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let chat = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(chat, area);
}
