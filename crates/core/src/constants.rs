//! Constants used throughout the patients core crate.

/// Default location of the patient document when no explicit file is configured.
pub const DEFAULT_PATIENT_DATA_FILE: &str = "patients.json";

/// Lower bound (exclusive) for a patient's age in years.
pub const MIN_AGE_EXCLUSIVE: i64 = 0;

/// Upper bound (exclusive) for a patient's age in years.
pub const MAX_AGE_EXCLUSIVE: i64 = 120;

/// BMI below which a patient is classed as underweight.
pub const UNDERWEIGHT_BELOW: f64 = 18.5;

/// BMI below which a patient is classed as normal weight.
pub const NORMAL_WEIGHT_BELOW: f64 = 25.0;

/// BMI below which a patient is classed as overweight. Anything at or above is obesity.
pub const OVERWEIGHT_BELOW: f64 = 29.9;
