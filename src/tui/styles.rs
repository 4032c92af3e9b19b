//! Terminal colours and text styles.
//!
//! Dark background, one cool accent for focus, and the three risk bands
//! reserved for results and errors.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::RiskLevel;

pub struct Palette;

impl Palette {
    /// Sky blue, used for focus and key names
    pub const ACCENT: Color = Color::Rgb(56, 189, 248);
    /// Deep cyan behind a chosen option
    pub const ACCENT_DIM: Color = Color::Rgb(14, 116, 144);
    pub const FRAME: Color = Color::Rgb(71, 85, 105);

    pub const LOW_RISK: Color = Color::Rgb(74, 222, 128);
    pub const MODERATE_RISK: Color = Color::Rgb(250, 204, 21);
    pub const HIGH_RISK: Color = Color::Rgb(248, 113, 113);

    pub const INK: Color = Color::Rgb(226, 232, 240);
    pub const INK_SOFT: Color = Color::Rgb(148, 163, 184);
    pub const INK_FAINT: Color = Color::Rgb(100, 116, 139);

    #[must_use]
    pub fn heading() -> Style {
        Style::default().fg(Self::INK).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn section() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    #[must_use]
    pub fn body() -> Style {
        Style::default().fg(Self::INK)
    }

    #[must_use]
    pub fn secondary() -> Style {
        Style::default().fg(Self::INK_SOFT)
    }

    #[must_use]
    pub fn faint() -> Style {
        Style::default()
            .fg(Self::INK_FAINT)
            .add_modifier(Modifier::ITALIC)
    }

    #[must_use]
    pub fn ok() -> Style {
        Style::default().fg(Self::LOW_RISK)
    }

    #[must_use]
    pub fn caution() -> Style {
        Style::default().fg(Self::MODERATE_RISK)
    }

    #[must_use]
    pub fn alert() -> Style {
        Style::default()
            .fg(Self::HIGH_RISK)
            .add_modifier(Modifier::BOLD)
    }

    /// Option currently picked in a choice field
    #[must_use]
    pub fn chosen() -> Style {
        Style::default().fg(Self::INK).bg(Self::ACCENT_DIM)
    }

    #[must_use]
    pub fn active() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    #[must_use]
    pub fn caret() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::SLOW_BLINK)
    }

    #[must_use]
    pub fn frame() -> Style {
        Style::default().fg(Self::FRAME)
    }

    #[must_use]
    pub fn frame_active() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    #[must_use]
    pub fn key() -> Style {
        Style::default().fg(Self::INK).bg(Self::FRAME)
    }

    #[must_use]
    pub fn key_label() -> Style {
        Style::default().fg(Self::INK_SOFT)
    }

    #[must_use]
    pub fn risk(level: RiskLevel) -> Style {
        match level {
            RiskLevel::Low => Self::ok(),
            RiskLevel::Moderate => Self::caution(),
            RiskLevel::High => Self::alert(),
        }
    }
}
