//! Clinical data entry form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    ChestPainType, ClinicalInput, ExerciseAngina, FastingBloodSugar, RawClinicalInput, RawFlag,
    RestingEcg, Sex, StSlope, AGE_RANGE,
};
use crate::tui::styles::Palette;

/// What a form field holds.
#[derive(Debug, Clone)]
pub enum FieldInput {
    /// Free numeric entry, optionally bounded
    Numeric {
        value: String,
        range: Option<(f64, f64)>,
    },
    /// One option out of a closed set
    Choice {
        options: Vec<&'static str>,
        selected: usize,
    },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub input: FieldInput,
}

impl FormField {
    fn numeric(label: &'static str, hint: &'static str, range: Option<(f64, f64)>) -> Self {
        Self {
            label,
            hint,
            input: FieldInput::Numeric {
                value: String::new(),
                range,
            },
        }
    }

    fn choice<T: Copy>(label: &'static str, hint: &'static str, all: &[T], name: fn(T) -> &'static str) -> Self {
        Self {
            label,
            hint,
            input: FieldInput::Choice {
                options: all.iter().map(|v| name(*v)).collect(),
                selected: 0,
            },
        }
    }

    /// Text currently shown for this field.
    #[must_use]
    pub fn display_value(&self) -> &str {
        match &self.input {
            FieldInput::Numeric { value, .. } => value,
            FieldInput::Choice { options, selected } => options[*selected],
        }
    }
}

// Field positions, in display order.
const AGE: usize = 0;
const SEX: usize = 1;
const CHEST_PAIN: usize = 2;
const RESTING_BP: usize = 3;
const CHOLESTEROL: usize = 4;
const FASTING_BS: usize = 5;
const RESTING_ECG: usize = 6;
const MAX_HR: usize = 7;
const EXERCISE_ANGINA: usize = 8;
const OLDPEAK: usize = 9;
const ST_SLOPE: usize = 10;

/// Clinical form state
pub struct ClinicalFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for ClinicalFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::numeric(
                    "Age",
                    "years, 25 to 80",
                    Some((*AGE_RANGE.start(), *AGE_RANGE.end())),
                ),
                FormField::choice(
                    "Sex",
                    "Men carry more risk before 55, women after menopause",
                    Sex::ALL,
                    Sex::label,
                ),
                FormField::choice(
                    "Chest Pain Type",
                    "TA typical angina, ATA atypical angina, NAP non-anginal pain, ASY no symptoms",
                    ChestPainType::ALL,
                    ChestPainType::label,
                ),
                FormField::numeric(
                    "Resting Blood Pressure",
                    "mmHg at rest; 90-120 is normal, higher is a risk factor",
                    None,
                ),
                FormField::numeric(
                    "Cholesterol",
                    "mg/dl; under 200 desirable, 200-239 borderline, 240+ high",
                    None,
                ),
                FormField::choice(
                    "Fasting Blood Sugar",
                    "1 if fasting glucose > 120 mg/dl (diabetic range), else 0",
                    FastingBloodSugar::ALL,
                    FastingBloodSugar::label,
                ),
                FormField::choice(
                    "Resting ECG",
                    "ST: ST-T wave abnormality, LVH: left ventricular hypertrophy",
                    RestingEcg::ALL,
                    RestingEcg::label,
                ),
                FormField::numeric(
                    "Max Heart Rate",
                    "bpm reached in exercise; expected peak is about 220 minus age",
                    None,
                ),
                FormField::choice(
                    "Exercise Angina",
                    "Chest pain on exertion points to coronary disease",
                    ExerciseAngina::ALL,
                    ExerciseAngina::label,
                ),
                FormField::numeric(
                    "ST Depression (Oldpeak)",
                    "mm, exercise vs. rest; higher values suggest ischemia",
                    None,
                ),
                FormField::choice(
                    "ST Slope",
                    "Up is reassuring, Flat is concerning, Down suggests ischemia",
                    StSlope::ALL,
                    StSlope::label,
                ),
            ],
            selected_field: 0,
            error_message: None,
        }
    }
}

impl ClinicalFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle the option of the current field, if it is a choice.
    pub fn cycle_choice(&mut self, forward: bool) {
        if let FieldInput::Choice { options, selected } = &mut self.fields[self.selected_field].input {
            let n = options.len();
            *selected = if forward { (*selected + 1) % n } else { (*selected + n - 1) % n };
            self.error_message = None;
        }
    }

    /// Add a character to the current field
    pub fn input_char(&mut self, c: char) {
        if let FieldInput::Numeric { value, .. } = &mut self.fields[self.selected_field].input {
            if c.is_ascii_digit() || c == '.' || c == '-' {
                value.push(c);
                self.error_message = None;
            }
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let FieldInput::Numeric { value, .. } = &mut self.fields[self.selected_field].input {
            value.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        if let FieldInput::Numeric { value, .. } = &mut self.fields[self.selected_field].input {
            value.zeroize();
        }
    }

    /// Whether the current field takes typed digits.
    #[must_use]
    pub fn current_is_numeric(&self) -> bool {
        matches!(self.fields[self.selected_field].input, FieldInput::Numeric { .. })
    }

    /// Wipe all field buffers from memory and reset choices.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            match &mut field.input {
                FieldInput::Numeric { value, .. } => value.zeroize(),
                FieldInput::Choice { selected, .. } => *selected = 0,
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    fn numeric(&self, idx: usize) -> Result<f64, String> {
        let field = &self.fields[idx];
        let FieldInput::Numeric { value, range } = &field.input else {
            return Err(format!("{}: Not a numeric field", field.label));
        };

        let parsed: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("{}: Invalid number", field.label))?;

        if let Some((min, max)) = range {
            if parsed < *min || parsed > *max {
                return Err(format!(
                    "{}: Value must be between {} and {}",
                    field.label, min, max
                ));
            }
        }
        Ok(parsed)
    }

    fn choice(&self, idx: usize) -> String {
        self.fields[idx].display_value().to_string()
    }

    /// Collect the form into an untyped request.
    ///
    /// # Errors
    /// Returns a message naming the first numeric field that is empty,
    /// unparsable or out of range.
    pub fn to_raw_input(&self) -> Result<RawClinicalInput, String> {
        Ok(RawClinicalInput {
            age: self.numeric(AGE)?,
            sex: self.choice(SEX),
            chest_pain: self.choice(CHEST_PAIN),
            resting_bp: self.numeric(RESTING_BP)?,
            cholesterol: self.numeric(CHOLESTEROL)?,
            fasting_bs: RawFlag::Label(self.choice(FASTING_BS)),
            resting_ecg: self.choice(RESTING_ECG),
            max_hr: self.numeric(MAX_HR)?,
            exercise_angina: self.choice(EXERCISE_ANGINA),
            oldpeak: self.numeric(OLDPEAK)?,
            st_slope: self.choice(ST_SLOPE),
        })
    }

    /// Validate and convert to a typed request.
    ///
    /// # Errors
    /// Returns a user-facing message on the first problem found.
    pub fn to_clinical_input(&self) -> Result<ClinicalInput, String> {
        let input = self.to_raw_input()?.parse().map_err(|e| e.to_string())?;
        input.validate().map_err(|errors| errors.join(", "))?;
        Ok(input)
    }

    /// Fill the form from an existing request.
    pub fn load(&mut self, input: &ClinicalInput) {
        let raw = RawClinicalInput::from(input);
        let numbers = [
            (AGE, raw.age),
            (RESTING_BP, raw.resting_bp),
            (CHOLESTEROL, raw.cholesterol),
            (MAX_HR, raw.max_hr),
            (OLDPEAK, raw.oldpeak),
        ];
        let labels = [
            (SEX, input.sex.label()),
            (CHEST_PAIN, input.chest_pain.label()),
            (FASTING_BS, input.fasting_bs.label()),
            (RESTING_ECG, input.resting_ecg.label()),
            (EXERCISE_ANGINA, input.exercise_angina.label()),
            (ST_SLOPE, input.st_slope.label()),
        ];

        for (idx, number) in numbers {
            if let FieldInput::Numeric { value, .. } = &mut self.fields[idx].input {
                value.zeroize();
                value.push_str(&number.to_string());
            }
        }
        for (idx, label) in labels {
            if let FieldInput::Choice { options, selected } = &mut self.fields[idx].input {
                if let Some(pos) = options.iter().position(|o| *o == label) {
                    *selected = pos;
                }
            }
        }
        self.error_message = None;
    }

    /// Load sample data (typical middle-aged patient)
    pub fn load_sample_data(&mut self) {
        self.load(&ClinicalInput::sample());
    }
}

/// Render the clinical data entry form
pub fn render_clinical_form(f: &mut Frame, area: Rect, state: &ClinicalFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Field guidance or error, then keys
        ])
        .split(area);

    super::render_header(f, chunks[0], "Heart Disease Prediction", "Patient Information");
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &ClinicalFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = state.fields.len().div_ceil(2);

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(f, columns[1], &state.fields[mid..], mid, state.selected_field);
}

fn render_field_column(f: &mut Frame, area: Rect, fields: &[FormField], offset: usize, selected: usize) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (Palette::frame_active(), Palette::active())
        } else {
            (Palette::frame(), Palette::secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        match &field.input {
            FieldInput::Numeric { value, .. } => {
                if value.is_empty() {
                    spans.push(Span::styled(field.hint, Palette::faint()));
                } else {
                    spans.push(Span::styled(value.as_str(), Palette::body()));
                }
                if is_selected {
                    spans.push(Span::styled("▌", Palette::caret()));
                }
            }
            FieldInput::Choice { options, selected: chosen } => {
                for (j, option) in options.iter().enumerate() {
                    let style = if j == *chosen {
                        Palette::chosen()
                    } else {
                        Palette::faint()
                    };
                    spans.push(Span::styled(format!(" {option} "), style));
                    spans.push(Span::raw(" "));
                }
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &ClinicalFormState) {
    let field = &state.fields[state.selected_field];
    let first = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", Palette::alert()),
            Span::styled(err.clone(), Palette::alert()),
        ])
    } else {
        Line::from(vec![
            Span::styled(format!("{}: ", field.label), Palette::active()),
            Span::styled(field.hint, Palette::secondary()),
        ])
    };

    let keys = if state.current_is_numeric() {
        super::key_hints(&[
            ("↑↓", "Navigate"),
            ("0-9", "Type"),
            ("Del", "Clear"),
            ("Enter", "Predict"),
            ("S", "Sample Data"),
            ("?", "About"),
            ("Esc", "Quit"),
        ])
    } else {
        super::key_hints(&[
            ("↑↓", "Navigate"),
            ("←→", "Choose"),
            ("Enter", "Predict"),
            ("S", "Sample Data"),
            ("?", "About"),
            ("Esc", "Quit"),
        ])
    };

    let footer = Paragraph::new(vec![first, keys]).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Palette::frame()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_round_trips() {
        let mut state = ClinicalFormState::default();
        state.load_sample_data();
        assert_eq!(state.to_clinical_input().unwrap(), ClinicalInput::sample());
    }

    #[test]
    fn test_empty_form_names_first_field() {
        let state = ClinicalFormState::default();
        let err = state.to_clinical_input().unwrap_err();
        assert!(err.starts_with("Age"));
    }

    #[test]
    fn test_age_outside_range_is_rejected() {
        let mut state = ClinicalFormState::default();
        state.load_sample_data();
        state.selected_field = AGE;
        state.clear_field();
        state.input_char('9');
        state.input_char('0');
        let err = state.to_clinical_input().unwrap_err();
        assert!(err.contains("between 25 and 80"));
    }

    #[test]
    fn test_choice_cycles_and_ignores_typing() {
        let mut state = ClinicalFormState::default();
        assert!(state.current_is_numeric());
        state.selected_field = CHEST_PAIN;
        assert!(!state.current_is_numeric());

        state.cycle_choice(false);
        assert_eq!(state.fields[CHEST_PAIN].display_value(), "ASY");
        state.cycle_choice(true);
        assert_eq!(state.fields[CHEST_PAIN].display_value(), "ATA");

        state.input_char('7');
        assert_eq!(state.fields[CHEST_PAIN].display_value(), "ATA");
    }

    #[test]
    fn test_negative_cholesterol_fails_validation() {
        let mut state = ClinicalFormState::default();
        state.load_sample_data();
        state.selected_field = CHOLESTEROL;
        state.clear_field();
        state.input_char('-');
        state.input_char('5');
        assert!(state.to_clinical_input().unwrap_err().contains("Cholesterol"));
    }

    #[test]
    fn test_clear_sensitive_wipes_values() {
        let mut state = ClinicalFormState::default();
        state.load_sample_data();
        state.selected_field = 4;
        state.clear_sensitive();

        assert_eq!(state.selected_field, 0);
        assert!(state.fields.iter().all(|f| match &f.input {
            FieldInput::Numeric { value, .. } => value.is_empty(),
            FieldInput::Choice { selected, .. } => *selected == 0,
        }));
    }

    #[test]
    fn test_hints_carry_reference_ranges() {
        let state = ClinicalFormState::default();
        assert!(state.fields[RESTING_BP].hint.contains("90-120"));
        assert!(state.fields[CHOLESTEROL].hint.contains("200-239"));
        assert!(state.fields[MAX_HR].hint.contains("220 minus age"));
        assert!(state.fields[ST_SLOPE].hint.contains("Down suggests ischemia"));
        assert!(state.fields.iter().all(|f| !f.hint.is_empty()));
    }
}
