//! About screen: model background and heart disease risk factors.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::Palette;

const RISK_FACTORS: &[(&str, &str)] = &[
    ("Age", "Risk increases with age"),
    ("Sex", "Men are at higher risk"),
    ("Chest Pain", "Certain types of chest pain are warning signs"),
    ("Blood Pressure", "High blood pressure damages arteries"),
    ("Cholesterol", "High levels can build up in the arteries"),
    ("Blood Sugar", "Diabetes increases the risk"),
    ("ECG", "Abnormal readings may indicate problems"),
    ("Max Heart Rate", "Lower achieved rates can indicate issues"),
    ("Exercise Angina", "Chest pain during exercise is a warning sign"),
    ("ST Depression / Slope", "ECG changes during exercise"),
];

pub fn render_about(f: &mut Frame, area: Rect, model_summary: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    super::render_header(f, chunks[0], "About", "Heart Disease Risk Factors");

    let mut lines = vec![
        Line::from(Span::styled("About This Tool", Palette::section())),
        Line::from(Span::styled(
            "Estimates the probability of heart disease from eleven clinical measurements. \
             The model was trained on the UCI Heart Disease dataset with 918 patients.",
            Palette::body(),
        )),
        Line::from(Span::styled(model_summary.to_string(), Palette::faint())),
        Line::from(""),
        Line::from(Span::styled("Risk Factors", Palette::section())),
    ];
    lines.extend(RISK_FACTORS.iter().map(|(factor, note)| {
        Line::from(vec![
            Span::styled(format!("  {factor}: "), Palette::active()),
            Span::styled(*note, Palette::secondary()),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Always consult healthcare professionals for medical advice.",
        Palette::caution(),
    )));

    let body = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Palette::frame())
            .padding(ratatui::widgets::Padding::horizontal(1)),
    );
    f.render_widget(body, chunks[1]);

    let footer = Paragraph::new(super::key_hints(&[("Esc", "Back")])).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Palette::frame()),
    );
    f.render_widget(footer, chunks[2]);
}
