//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{HeartDiseaseClass, Prediction, PredictionDisplay, RiskLevel};
use crate::tui::styles::Palette;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Completed with a prediction
    Complete { prediction: Prediction },
    /// The request failed; the app keeps running
    Error { message: String, hint: String },
}

pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    super::render_header(f, chunks[0], "Prediction Results", "Class Probabilities");

    match state {
        ResultState::Idle => render_idle(f, chunks[1]),
        ResultState::Complete { prediction } => render_prediction(f, chunks[1], prediction),
        ResultState::Error { message, hint } => render_error(f, chunks[1], message, hint),
    }

    let hints = match state {
        ResultState::Error { .. } => super::key_hints(&[("Enter", "Fix Input"), ("?", "About")]),
        _ => super::key_hints(&[("Enter", "New Patient"), ("?", "About"), ("Esc", "Back")]),
    };
    let footer = Paragraph::new(hints).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Palette::frame()),
    );
    f.render_widget(footer, chunks[2]);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No prediction yet",
            Palette::secondary(),
        )),
        Line::from(Span::styled(
            "Fill in the patient information and press Enter",
            Palette::faint(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Palette::frame()),
    );

    f.render_widget(content, area);
}

fn render_prediction(f: &mut Frame, area: Rect, prediction: &Prediction) {
    let block = Block::default()
        .title(Span::styled(" Prediction ", Palette::section()))
        .borders(Borders::ALL)
        .border_style(Palette::frame_active());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Verdict
            Constraint::Length(4), // No Heart Disease
            Constraint::Length(4), // Heart Disease
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let risk = prediction.risk_level();
    let risk_style = Palette::risk(risk);

    let verdict = Paragraph::new(vec![
        Line::from(Span::styled(
            prediction.label.label(),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!("{risk} "), risk_style),
            Span::styled(risk.description(), Palette::secondary()),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(verdict, chunks[0]);

    let display = PredictionDisplay::from(prediction);
    for (i, (label, probability)) in display.entries().into_iter().enumerate() {
        let style = if i == HeartDiseaseClass::HeartDisease.index() {
            risk_style
        } else {
            Palette::risk(RiskLevel::Low)
        };
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(Span::styled(format!(" {label} "), Palette::secondary()))
                    .borders(Borders::ALL)
                    .border_style(Palette::frame()),
            )
            .gauge_style(style)
            .ratio(probability.clamp(0.0, 1.0))
            .label(format!("{:.1}%", probability * 100.0));
        f.render_widget(gauge, chunks[1 + i]);
    }
}

fn render_error(f: &mut Frame, area: Rect, message: &str, hint: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction failed", Palette::alert())),
        Line::from(""),
        Line::from(Span::styled(message, Palette::body())),
        Line::from(Span::styled(hint, Palette::faint())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Palette::alert()),
    );

    f.render_widget(content, area);
}
