//! Clinical input record for heart disease risk estimation.
//!
//! Eleven measurements, matching the UCI heart failure prediction dataset
//! (918 patients) the classifier was trained on. Categorical fields are
//! closed enums so a well-typed caller can never submit an unknown label;
//! string callers go through [`RawClinicalInput::parse`].

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PredictError;

/// Accepted age range in years.
pub const AGE_RANGE: RangeInclusive<f64> = 25.0..=80.0;

/// Declares a categorical field: the enum, its UI labels and label parsing.
macro_rules! categorical {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            /// Name of the input field this category belongs to.
            pub const FIELD: &'static str = $field;

            /// Every accepted value, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Label shown to the user and accepted by `FromStr`.
            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Step to the next (or previous) value, wrapping around.
            #[must_use]
            pub fn cycle(self, forward: bool) -> Self {
                let n = Self::ALL.len();
                let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
                let next = if forward { (idx + 1) % n } else { (idx + n - 1) % n };
                Self::ALL[next]
            }
        }

        impl FromStr for $name {
            type Err = PredictError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| PredictError::UnknownCategory {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

categorical! {
    /// Biological sex. Reference category: Female.
    pub enum Sex as "sex" {
        Male => "Male",
        Female => "Female",
    }
}

categorical! {
    /// Chest pain type. Reference category: ASY.
    pub enum ChestPainType as "chest_pain" {
        /// Atypical angina
        Ata => "ATA",
        /// Non-anginal pain
        Nap => "NAP",
        /// Typical angina
        Ta => "TA",
        /// Asymptomatic
        Asy => "ASY",
    }
}

categorical! {
    /// Fasting blood sugar above 120 mg/dl. Reference category: 0.
    pub enum FastingBloodSugar as "fasting_bs" {
        Normal => "0",
        Elevated => "1",
    }
}

categorical! {
    /// Resting electrocardiogram result. Reference category: LVH.
    pub enum RestingEcg as "resting_ecg" {
        Normal => "Normal",
        /// ST-T wave abnormality
        St => "ST",
        /// Left ventricular hypertrophy
        Lvh => "LVH",
    }
}

categorical! {
    /// Exercise induced angina. Reference category: No.
    pub enum ExerciseAngina as "exercise_angina" {
        Yes => "Yes",
        No => "No",
    }
}

categorical! {
    /// Slope of the peak exercise ST segment. Reference category: Down.
    pub enum StSlope as "st_slope" {
        Up => "Up",
        Flat => "Flat",
        Down => "Down",
    }
}

impl FastingBloodSugar {
    /// Numeric flag as it appears in the feature row.
    #[must_use]
    pub fn as_flag(self) -> f64 {
        match self {
            Self::Normal => 0.0,
            Self::Elevated => 1.0,
        }
    }
}

/// One prediction request with typed categorical fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalInput {
    /// Age in years (25-80)
    pub age: f64,
    pub sex: Sex,
    pub chest_pain: ChestPainType,
    /// Resting blood pressure in mmHg
    pub resting_bp: f64,
    /// Serum cholesterol in mg/dl
    pub cholesterol: f64,
    pub fasting_bs: FastingBloodSugar,
    pub resting_ecg: RestingEcg,
    /// Maximum heart rate achieved during exercise
    pub max_hr: f64,
    pub exercise_angina: ExerciseAngina,
    /// ST depression induced by exercise relative to rest
    pub oldpeak: f64,
    pub st_slope: StSlope,
}

impl ClinicalInput {
    /// Validate the numeric fields.
    ///
    /// # Errors
    /// Returns every violation found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !self.age.is_finite() || !AGE_RANGE.contains(&self.age) {
            errors.push(format!(
                "Age {} out of range [{}, {}]",
                self.age,
                AGE_RANGE.start(),
                AGE_RANGE.end()
            ));
        }
        if !self.resting_bp.is_finite() || self.resting_bp <= 0.0 {
            errors.push(format!(
                "Resting blood pressure {} must be a positive number",
                self.resting_bp
            ));
        }
        // Zero cholesterol occurs in the training data (unrecorded values).
        if !self.cholesterol.is_finite() || self.cholesterol < 0.0 {
            errors.push(format!(
                "Cholesterol {} must not be negative",
                self.cholesterol
            ));
        }
        if !self.max_hr.is_finite() || self.max_hr <= 0.0 {
            errors.push(format!(
                "Maximum heart rate {} must be a positive number",
                self.max_hr
            ));
        }
        if !self.oldpeak.is_finite() {
            errors.push(format!("ST depression {} must be a number", self.oldpeak));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The typical patient used by the "sample data" shortcut.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            age: 54.0,
            sex: Sex::Male,
            chest_pain: ChestPainType::Ata,
            resting_bp: 130.0,
            cholesterol: 246.0,
            fasting_bs: FastingBloodSugar::Normal,
            resting_ecg: RestingEcg::Normal,
            max_hr: 150.0,
            exercise_angina: ExerciseAngina::No,
            oldpeak: 1.0,
            st_slope: StSlope::Up,
        }
    }
}

/// Fasting blood sugar as sent by an untyped caller: `0`, `1`, `"0"` or `"1"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Number(f64),
    Label(String),
}

/// Request with categorical fields still as free-form labels.
///
/// This is the shape accepted by the JSON interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClinicalInput {
    pub age: f64,
    pub sex: String,
    pub chest_pain: String,
    pub resting_bp: f64,
    pub cholesterol: f64,
    pub fasting_bs: RawFlag,
    pub resting_ecg: String,
    pub max_hr: f64,
    pub exercise_angina: String,
    pub oldpeak: f64,
    pub st_slope: String,
}

impl RawClinicalInput {
    /// Resolve every categorical label.
    ///
    /// # Errors
    /// Returns `PredictError::UnknownCategory` for the first label that is
    /// not part of its field's closed set.
    pub fn parse(&self) -> Result<ClinicalInput, PredictError> {
        let fasting_bs = match &self.fasting_bs {
            RawFlag::Number(v) if *v == 0.0 => FastingBloodSugar::Normal,
            RawFlag::Number(v) if *v == 1.0 => FastingBloodSugar::Elevated,
            RawFlag::Number(v) => {
                return Err(PredictError::UnknownCategory {
                    field: FastingBloodSugar::FIELD,
                    value: v.to_string(),
                })
            }
            RawFlag::Label(label) => label.parse()?,
        };

        Ok(ClinicalInput {
            age: self.age,
            sex: self.sex.parse()?,
            chest_pain: self.chest_pain.parse()?,
            resting_bp: self.resting_bp,
            cholesterol: self.cholesterol,
            fasting_bs,
            resting_ecg: self.resting_ecg.parse()?,
            max_hr: self.max_hr,
            exercise_angina: self.exercise_angina.parse()?,
            oldpeak: self.oldpeak,
            st_slope: self.st_slope.parse()?,
        })
    }
}

impl From<&ClinicalInput> for RawClinicalInput {
    fn from(input: &ClinicalInput) -> Self {
        Self {
            age: input.age,
            sex: input.sex.label().to_string(),
            chest_pain: input.chest_pain.label().to_string(),
            resting_bp: input.resting_bp,
            cholesterol: input.cholesterol,
            fasting_bs: RawFlag::Number(input.fasting_bs.as_flag()),
            resting_ecg: input.resting_ecg.label().to_string(),
            max_hr: input.max_hr,
            exercise_angina: input.exercise_angina.label().to_string(),
            oldpeak: input.oldpeak,
            st_slope: input.st_slope.label().to_string(),
        }
    }
}
