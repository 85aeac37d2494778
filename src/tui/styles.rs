//! Color palette and styles.
//!
//! Calm teal chrome. Saturated colors are kept for urgency tiers and for the
//! two transcript speakers, so a diagnosis block stands out from the chat.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{Role, UrgencyTier};

/// Medical theme color palette.
pub struct MedicalTheme;

impl MedicalTheme {
    /// Deep teal
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF
    pub const PRIMARY_DARK: Color = Color::Rgb(15, 118, 110); // #0F766E

    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A
    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    pub const HOME_CARE: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const MONITOR: Color = Color::Rgb(56, 189, 248); // #38BDF8
    pub const CONSULT: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const EMERGENCY: Color = Color::Rgb(244, 63, 94); // #F43F5E

    /// Patient answers
    pub const PATIENT: Color = Color::Rgb(129, 140, 248); // #818CF8

    #[must_use]
    pub fn tier_color(tier: UrgencyTier) -> Color {
        match tier {
            UrgencyTier::HomeCare => Self::HOME_CARE,
            UrgencyTier::Monitor => Self::MONITOR,
            UrgencyTier::Consult => Self::CONSULT,
            UrgencyTier::Emergency => Self::EMERGENCY,
        }
    }

    /// Foreground for text tied to a tier (confidence, disease name).
    #[must_use]
    pub fn tier(tier: UrgencyTier) -> Style {
        let style = Style::default().fg(Self::tier_color(tier));
        if tier == UrgencyTier::Emergency {
            style.add_modifier(Modifier::SLOW_BLINK)
        } else {
            style
        }
    }

    /// Filled `[TIER]` badge in the advice line.
    #[must_use]
    pub fn tier_badge(tier: UrgencyTier) -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::tier_color(tier))
            .add_modifier(Modifier::BOLD)
    }

    /// Speaker label above a transcript turn.
    #[must_use]
    pub fn speaker(role: Role) -> Style {
        let color = match role {
            Role::Assistant => Self::PRIMARY_LIGHT,
            Role::User => Self::PATIENT,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Failed analysis in the transcript.
    #[must_use]
    pub fn alert() -> Style {
        Style::default()
            .fg(Self::EMERGENCY)
            .add_modifier(Modifier::ITALIC)
    }

    /// Rejected answers and the standing disclaimer.
    #[must_use]
    pub fn caution() -> Style {
        Style::default().fg(Self::CONSULT)
    }

    /// Symptoms already picked at the symptom step.
    #[must_use]
    pub fn chosen() -> Style {
        Style::default().fg(Self::PATIENT)
    }

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    /// Highlighted option in a choice list
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::RAPID_BLINK)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    /// `[Key]` part of the footer hints
    #[must_use]
    pub fn key_hint() -> Style {
        Self::focused()
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Self::text_secondary()
    }
}
