//! UI module: View components for the TUI.

pub mod chat;
pub mod intake;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::Step;
use crate::tui::styles::MedicalTheme;

pub fn render_header(f: &mut Frame, area: Rect, user: &str, step: Step) {
    let progress = match step {
        Step::Start => "Welcome".to_string(),
        Step::Analyze => "Analyzing".to_string(),
        Step::Complete => "Complete".to_string(),
        other => format!("Step {} of 5 │ {}", other.index(), other),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" MediChat ", MedicalTheme::header()),
        Span::styled(format!("  {progress}"), MedicalTheme::text_secondary()),
        Span::styled(format!("  │ {user}"), MedicalTheme::text_muted()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(header, area);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![
        Span::styled("DISCLAIMER: ", MedicalTheme::caution()),
        Span::styled(
            "Not professional medical advice. Urgency tiers are advisory only.",
            MedicalTheme::text_muted(),
        ),
    ])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
