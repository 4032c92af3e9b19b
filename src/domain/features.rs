//! Feature schema and one-hot encoding of a clinical input.
//!
//! The schema is the ordered list of column names the scaler and classifier
//! were fitted against (`feature_names.txt`). Encoding is a pure function of
//! the input; column order always follows the schema.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::clinical::{
    ChestPainType, ClinicalInput, ExerciseAngina, RawClinicalInput, RestingEcg, Sex, StSlope,
};
use super::PredictError;

/// Number of columns in an encoded row.
pub const FEATURE_COUNT: usize = 15;

/// A column of the encoded feature row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    Age,
    RestingBp,
    Cholesterol,
    FastingBs,
    MaxHr,
    Oldpeak,
    SexM,
    ChestPainAta,
    ChestPainNap,
    ChestPainTa,
    RestingEcgNormal,
    RestingEcgSt,
    ExerciseAnginaY,
    StSlopeFlat,
    StSlopeUp,
}

impl Column {
    /// All columns, in the order produced by the training notebook.
    pub const ALL: [Column; FEATURE_COUNT] = [
        Column::Age,
        Column::RestingBp,
        Column::Cholesterol,
        Column::FastingBs,
        Column::MaxHr,
        Column::Oldpeak,
        Column::SexM,
        Column::ChestPainAta,
        Column::ChestPainNap,
        Column::ChestPainTa,
        Column::RestingEcgNormal,
        Column::RestingEcgSt,
        Column::ExerciseAnginaY,
        Column::StSlopeFlat,
        Column::StSlopeUp,
    ];

    /// Columns passed through the scaler, in the order the scaler was fitted.
    pub const CONTINUOUS: [Column; 5] = [
        Column::Age,
        Column::RestingBp,
        Column::Cholesterol,
        Column::MaxHr,
        Column::Oldpeak,
    ];

    /// Column name as written in `feature_names.txt`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::RestingBp => "RestingBP",
            Self::Cholesterol => "Cholesterol",
            Self::FastingBs => "FastingBS",
            Self::MaxHr => "MaxHR",
            Self::Oldpeak => "Oldpeak",
            Self::SexM => "Sex_M",
            Self::ChestPainAta => "ChestPainType_ATA",
            Self::ChestPainNap => "ChestPainType_NAP",
            Self::ChestPainTa => "ChestPainType_TA",
            Self::RestingEcgNormal => "RestingECG_Normal",
            Self::RestingEcgSt => "RestingECG_ST",
            Self::ExerciseAnginaY => "ExerciseAngina_Y",
            Self::StSlopeFlat => "ST_Slope_Flat",
            Self::StSlopeUp => "ST_Slope_Up",
        }
    }

    /// Look up a column by its exact name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Whether the scaler transforms this column.
    #[must_use]
    pub fn is_continuous(self) -> bool {
        Self::CONTINUOUS.contains(&self)
    }

    /// Value of this column for the given input.
    #[must_use]
    pub fn extract(self, input: &ClinicalInput) -> f64 {
        match self {
            Self::Age => input.age,
            Self::RestingBp => input.resting_bp,
            Self::Cholesterol => input.cholesterol,
            Self::FastingBs => input.fasting_bs.as_flag(),
            Self::MaxHr => input.max_hr,
            Self::Oldpeak => input.oldpeak,
            Self::SexM => indicator(input.sex == Sex::Male),
            Self::ChestPainAta => indicator(input.chest_pain == ChestPainType::Ata),
            Self::ChestPainNap => indicator(input.chest_pain == ChestPainType::Nap),
            Self::ChestPainTa => indicator(input.chest_pain == ChestPainType::Ta),
            Self::RestingEcgNormal => indicator(input.resting_ecg == RestingEcg::Normal),
            Self::RestingEcgSt => indicator(input.resting_ecg == RestingEcg::St),
            Self::ExerciseAnginaY => indicator(input.exercise_angina == ExerciseAngina::Yes),
            Self::StSlopeFlat => indicator(input.st_slope == StSlope::Flat),
            Self::StSlopeUp => indicator(input.st_slope == StSlope::Up),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn indicator(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

/// Why a feature schema was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("empty column name at position {0}")]
    EmptyName(usize),

    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    #[error("duplicate column {0:?}")]
    DuplicateColumn(String),

    #[error("expected {expected} columns, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// Ordered column list the artifacts were fitted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<Column>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
        }
    }
}

impl FeatureSchema {
    /// Parse the comma separated contents of `feature_names.txt`.
    ///
    /// Names are trimmed and a trailing newline is tolerated.
    ///
    /// # Errors
    /// Returns `SchemaError` unless the names are a permutation of the 15
    /// known columns.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let names: Vec<&str> = text.trim().split(',').map(str::trim).collect();
        Self::from_names(&names)
    }

    /// Build a schema from an ordered list of names.
    ///
    /// # Errors
    /// See [`FeatureSchema::parse`].
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SchemaError> {
        let mut seen = HashSet::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());

        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(SchemaError::EmptyName(i));
            }
            let column = Column::from_name(name)
                .ok_or_else(|| SchemaError::UnknownColumn(name.to_string()))?;
            if !seen.insert(column) {
                return Err(SchemaError::DuplicateColumn(name.to_string()));
            }
            columns.push(column);
        }

        if columns.len() != FEATURE_COUNT {
            return Err(SchemaError::WrongLength {
                expected: FEATURE_COUNT,
                actual: columns.len(),
            });
        }

        Ok(Self { columns })
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in schema order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Position of a column in the row.
    #[must_use]
    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

/// One encoded row, columns in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRow {
    columns: Vec<Column>,
    values: Vec<f64>,
}

impl EncodedRow {
    /// Pair columns with values.
    ///
    /// # Panics
    /// Panics if the lengths differ; rows are only built by this module and
    /// by the scaler, which preserve length.
    pub(crate) fn from_parts(columns: Vec<Column>, values: Vec<f64>) -> Self {
        assert_eq!(columns.len(), values.len(), "row columns and values differ");
        Self { columns, values }
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, column: Column) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|i| self.values[i])
    }

    /// `(name, value)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| (c.name(), *v))
    }
}

/// Encode a typed clinical input into a row following `schema`.
#[must_use]
pub fn encode(input: &ClinicalInput, schema: &FeatureSchema) -> EncodedRow {
    let values = schema.columns().iter().map(|c| c.extract(input)).collect();
    EncodedRow::from_parts(schema.columns().to_vec(), values)
}

/// Encode a request whose categorical fields are still labels.
///
/// # Errors
/// Returns `PredictError::UnknownCategory` before any column is produced if a
/// label is not recognised.
pub fn encode_raw(input: &RawClinicalInput, schema: &FeatureSchema) -> Result<EncodedRow, PredictError> {
    let parsed = input.parse()?;
    Ok(encode(&parsed, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clinical::FastingBloodSugar;

    const INDICATORS: [Column; 9] = [
        Column::SexM,
        Column::ChestPainAta,
        Column::ChestPainNap,
        Column::ChestPainTa,
        Column::RestingEcgNormal,
        Column::RestingEcgSt,
        Column::ExerciseAnginaY,
        Column::StSlopeFlat,
        Column::StSlopeUp,
    ];

    fn all_inputs() -> Vec<ClinicalInput> {
        let mut out = Vec::new();
        for &sex in Sex::ALL {
            for &chest_pain in ChestPainType::ALL {
                for &fasting_bs in FastingBloodSugar::ALL {
                    for &resting_ecg in RestingEcg::ALL {
                        for &exercise_angina in ExerciseAngina::ALL {
                            for &st_slope in StSlope::ALL {
                                out.push(ClinicalInput {
                                    sex,
                                    chest_pain,
                                    fasting_bs,
                                    resting_ecg,
                                    exercise_angina,
                                    st_slope,
                                    ..ClinicalInput::sample()
                                });
                            }
                        }
                    }
                }
            }
        }
        out
    }

    fn non_reference_groups(input: &ClinicalInput) -> usize {
        [
            input.sex != Sex::Female,
            input.chest_pain != ChestPainType::Asy,
            input.resting_ecg != RestingEcg::Lvh,
            input.exercise_angina != ExerciseAngina::No,
            input.st_slope != StSlope::Down,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    #[test]
    fn test_scenario_row() {
        let row = encode(&ClinicalInput::sample(), &FeatureSchema::default());

        assert_eq!(row.len(), FEATURE_COUNT);
        for (column, expected) in [
            (Column::SexM, 1.0),
            (Column::ChestPainAta, 1.0),
            (Column::ChestPainNap, 0.0),
            (Column::ChestPainTa, 0.0),
            (Column::RestingEcgNormal, 1.0),
            (Column::RestingEcgSt, 0.0),
            (Column::ExerciseAnginaY, 0.0),
            (Column::StSlopeFlat, 0.0),
            (Column::StSlopeUp, 1.0),
            (Column::Age, 54.0),
            (Column::RestingBp, 130.0),
            (Column::Cholesterol, 246.0),
            (Column::FastingBs, 0.0),
            (Column::MaxHr, 150.0),
            (Column::Oldpeak, 1.0),
        ] {
            assert_eq!(row.get(column), Some(expected), "column {column}");
        }
    }

    #[test]
    fn test_indicator_count_matches_non_reference_fields() {
        let schema = FeatureSchema::default();
        for input in all_inputs() {
            let row = encode(&input, &schema);
            let ones = INDICATORS
                .iter()
                .filter(|c| row.get(**c) == Some(1.0))
                .count();
            assert_eq!(ones, non_reference_groups(&input), "{input:?}");

            // Each group contributes at most one 1.
            let chest = [Column::ChestPainAta, Column::ChestPainNap, Column::ChestPainTa];
            let ecg = [Column::RestingEcgNormal, Column::RestingEcgSt];
            let slope = [Column::StSlopeFlat, Column::StSlopeUp];
            for group in [&chest[..], &ecg[..], &slope[..]] {
                let sum: f64 = group.iter().filter_map(|c| row.get(*c)).sum();
                assert!(sum <= 1.0);
            }
        }
    }

    #[test]
    fn test_reference_categories_encode_to_zero() {
        let input = ClinicalInput {
            sex: Sex::Female,
            chest_pain: ChestPainType::Asy,
            fasting_bs: FastingBloodSugar::Normal,
            resting_ecg: RestingEcg::Lvh,
            exercise_angina: ExerciseAngina::No,
            st_slope: StSlope::Down,
            ..ClinicalInput::sample()
        };
        let row = encode(&input, &FeatureSchema::default());
        for column in INDICATORS.iter().chain(std::iter::once(&Column::FastingBs)) {
            assert_eq!(row.get(*column), Some(0.0), "column {column}");
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let schema = FeatureSchema::default();
        let input = ClinicalInput {
            oldpeak: -0.1,
            ..ClinicalInput::sample()
        };
        let a = encode(&input, &schema);
        let b = encode(&input, &schema);
        let bits = |r: &EncodedRow| r.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_row_follows_schema_order() {
        let mut names = Column::ALL.map(Column::name).to_vec();
        names.reverse();
        let schema = FeatureSchema::from_names(&names).expect("Valid schema");

        let row = encode(&ClinicalInput::sample(), &schema);
        assert_eq!(row.columns()[0], Column::StSlopeUp);
        assert_eq!(row.values()[0], 1.0);
        assert_eq!(row.values()[FEATURE_COUNT - 1], 54.0);
    }

    #[test]
    fn test_schema_parse() {
        let text = "Age,RestingBP,Cholesterol,FastingBS,MaxHR,Oldpeak,Sex_M,ChestPainType_ATA,\
                    ChestPainType_NAP,ChestPainType_TA,RestingECG_Normal,RestingECG_ST,\
                    ExerciseAngina_Y,ST_Slope_Flat,ST_Slope_Up\n";
        assert_eq!(FeatureSchema::parse(text).unwrap(), FeatureSchema::default());
    }

    #[test]
    fn test_schema_rejects_bad_input() {
        assert!(matches!(
            FeatureSchema::parse("Age,RestingBP"),
            Err(SchemaError::WrongLength { expected: 15, actual: 2 })
        ));
        assert!(matches!(
            FeatureSchema::parse("Age,,RestingBP"),
            Err(SchemaError::EmptyName(1))
        ));
        assert!(matches!(
            FeatureSchema::parse("Age,Age"),
            Err(SchemaError::DuplicateColumn(_))
        ));
        assert!(matches!(
            FeatureSchema::parse("Age,Weight"),
            Err(SchemaError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_encode_raw_rejects_unknown_category() {
        let mut raw = RawClinicalInput::from(&ClinicalInput::sample());
        raw.chest_pain = "XYZ".into();
        let err = encode_raw(&raw, &FeatureSchema::default()).unwrap_err();
        assert!(matches!(err, PredictError::UnknownCategory { field: "chest_pain", .. }));
    }
}
