//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Running predictions through the service

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::artifacts::ArtifactBundle;
use crate::application::PredictionService;
use crate::config::Config;

use super::ui::{
    about::render_about,
    form::{render_clinical_form, ClinicalFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
    About,
}

/// Main application state
pub struct App {
    screen: Screen,

    /// Screen to return to when leaving About
    previous_screen: Screen,

    should_quit: bool,

    service: PredictionService,

    form_state: ClinicalFormState,

    result_state: ResultState,
}

impl App {
    /// Load the artifacts named by `config` and build the application.
    ///
    /// # Errors
    /// Returns error if the artifacts are missing, corrupt or inconsistent.
    /// The interface never starts without a usable model.
    pub fn new(config: &Config) -> Result<Self> {
        let bundle = ArtifactBundle::load(&config.model_path).with_context(|| {
            format!(
                "Failed to load model from {:?}. Set {} to a directory containing the artifacts.",
                config.model_path,
                crate::config::MODEL_PATH_ENV
            )
        })?;

        Ok(Self::with_service(PredictionService::new(Arc::new(bundle))))
    }

    /// Create application with an injected service (Composition Root pattern).
    #[must_use]
    pub fn with_service(service: PredictionService) -> Self {
        Self {
            screen: Screen::Form,
            previous_screen: Screen::Form,
            should_quit: false,
            service,
            form_state: ClinicalFormState::default(),
            result_state: ResultState::default(),
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let model_summary = self.model_summary();

        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Form => render_clinical_form(f, chunks[0], &self.form_state),
                    Screen::Result => render_result(f, chunks[0], &self.result_state),
                    Screen::About => render_about(f, chunks[0], &model_summary),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn model_summary(&self) -> String {
        let bundle = self.service.bundle();
        format!(
            "Loaded model: {} input columns, {} of them {}.",
            bundle.schema().len(),
            bundle.scaler().n_features(),
            bundle.scaler().method()
        )
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
            Screen::About => {
                if matches!(key, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
                    self.screen = self.previous_screen;
                }
            }
        }
    }

    fn open_about(&mut self) {
        self.previous_screen = self.screen;
        self.screen = Screen::About;
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left => {
                self.form_state.cycle_choice(false);
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                self.form_state.cycle_choice(true);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char('?') => {
                self.open_about();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Form;
            }
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N') => {
                if !matches!(self.result_state, ResultState::Error { .. }) {
                    self.form_state.clear_sensitive();
                    self.result_state = ResultState::Idle;
                }
                self.screen = Screen::Form;
            }
            KeyCode::Char('?') => {
                self.open_about();
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        // Out-of-range values are reported on the form, next to the fields.
        let input = match self.form_state.to_clinical_input() {
            Ok(input) => input,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        self.result_state = match self.service.predict(&input) {
            Ok(prediction) => {
                // Clear plaintext buffers from the UI once the request is answered.
                self.form_state.clear_sensitive();
                ResultState::Complete { prediction }
            }
            // Keep the values so the user can retry.
            Err(e) => ResultState::Error {
                message: e.to_string(),
                hint: e.remediation().to_string(),
            },
        };
        self.screen = Screen::Result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::{LogisticRegression, ScalerArtifact};
    use crate::domain::{FeatureSchema, FEATURE_COUNT};

    fn test_app() -> App {
        let classifier = LogisticRegression {
            feature_names: None,
            coefficients: vec![0.1; FEATURE_COUNT],
            intercept: -0.2,
        };
        let scaler = ScalerArtifact::Standard {
            feature_names: None,
            mean: vec![53.5, 132.4, 198.8, 136.8, 0.89],
            scale: vec![9.4, 18.5, 109.4, 25.5, 1.07],
        };
        let bundle = ArtifactBundle::from_parts(classifier, scaler, FeatureSchema::default())
            .expect("Consistent test bundle");
        App::with_service(PredictionService::new(Arc::new(bundle)))
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_submit_sample_shows_prediction() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Result);
        let ResultState::Complete { prediction } = &app.result_state else {
            panic!("expected a prediction, got {:?}", app.result_state);
        };
        let [p0, p1] = prediction.probabilities;
        assert!((p0 + p1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_form_stays_on_form() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Form);
        assert!(app.form_state.error_message.is_some());
    }

    fn enter_negative_cholesterol(app: &mut App) {
        press(app, KeyCode::Char('s'));
        // Cholesterol is the fifth field.
        for _ in 0..4 {
            press(app, KeyCode::Down);
        }
        press(app, KeyCode::Delete);
        press(app, KeyCode::Char('-'));
        press(app, KeyCode::Char('1'));
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_invalid_values_are_reported_on_the_form() {
        let mut app = test_app();
        enter_negative_cholesterol(&mut app);

        assert_eq!(app.screen(), Screen::Form);
        assert!(matches!(app.result_state, ResultState::Idle));
        let message = app.form_state.error_message.as_deref().unwrap_or_default();
        assert!(message.contains("Cholesterol"), "{message}");

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.result_state, ResultState::Complete { .. }));
    }

    #[test]
    fn test_about_returns_to_previous_screen() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.screen(), Screen::About);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::Form);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_ctrl_q_quits_from_any_screen() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_successful_submit_wipes_form() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert!(app.form_state.to_raw_input().is_err());

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen(), Screen::Form);
        assert!(matches!(app.result_state, ResultState::Idle));
    }

    #[test]
    fn test_failed_submit_keeps_values() {
        let mut app = test_app();
        enter_negative_cholesterol(&mut app);

        assert_eq!(app.screen(), Screen::Form);
        assert_eq!(app.form_state.fields[4].display_value(), "-1");
        assert_eq!(app.form_state.fields[0].display_value(), "54");
    }

    #[test]
    fn test_model_summary_names_scaler_kind() {
        assert!(test_app().model_summary().ends_with("5 of them standardized."));

        let classifier = LogisticRegression {
            feature_names: None,
            coefficients: vec![0.1; FEATURE_COUNT],
            intercept: 0.0,
        };
        let scaler = ScalerArtifact::MinMax {
            feature_names: None,
            min: vec![0.0; 5],
            scale: vec![0.01; 5],
        };
        let bundle = ArtifactBundle::from_parts(classifier, scaler, FeatureSchema::default())
            .expect("Consistent test bundle");
        let app = App::with_service(PredictionService::new(Arc::new(bundle)));
        assert_eq!(
            app.model_summary(),
            "Loaded model: 15 input columns, 5 of them min-max scaled."
        );
    }
}
