//! UI module: View components for the TUI.

pub mod about;
pub mod form;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::Palette;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "Note: This is for educational purposes only and not a medical diagnosis.",
            Palette::faint(),
        )]),
        Line::from(vec![Span::styled(
            "Estimates come from a model trained on the UCI Heart Disease dataset (918 patients).",
            Palette::faint(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Palette::frame());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// One-line header with a title and a subtitle.
pub(crate) fn render_header(f: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", Palette::body()),
        Span::styled(title.to_string(), Palette::heading()),
        Span::styled(format!(" │ {subtitle}"), Palette::secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Palette::frame()),
    );

    f.render_widget(header, area);
}

/// Footer line built from `[key] description` pairs.
pub(crate) fn key_hints(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let spans = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!(" {key} "), Palette::key()),
                Span::styled(format!(" {desc}  "), Palette::key_label()),
            ]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}
