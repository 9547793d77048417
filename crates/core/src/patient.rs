//! Patient model: validation, derived fields and partial updates.
//!
//! A [`Patient`] can only be obtained through [`Patient::new`] (or [`Patient::merge`], which
//! goes back through `new`). Both BMI and verdict are computed there from height and weight and
//! are never accepted from callers or from storage.
//!
//! The persisted form of a record is [`PatientFields`]: the raw, caller-supplied attributes
//! without the identifier (which is the map key in the stored document) and without the
//! derived values.

use crate::constants::{
    MAX_AGE_EXCLUSIVE, MIN_AGE_EXCLUSIVE, NORMAL_WEIGHT_BELOW, OVERWEIGHT_BELOW,
    UNDERWEIGHT_BELOW,
};
use crate::{PatientError, PatientResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// IDENTIFIER
// ============================================================================

/// Caller-supplied patient identifier, e.g. `P001`.
///
/// Surrounding whitespace is trimmed; a blank identifier is rejected.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatientId(String);

impl PatientId {
    /// Parses an identifier.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` if the trimmed input is empty.
    pub fn parse(input: impl AsRef<str>) -> PatientResult<Self> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PatientError::validation("id", "cannot be empty"));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientId::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// ENUMERATIONS
// ============================================================================

/// Supported gender values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = PatientError;

    /// Case-insensitive parse of `male`, `female` or `other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(PatientError::validation(
                "gender",
                format!("'{s}' is not one of male, female, other"),
            )),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health label derived from BMI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Underweight,
    NormalWeight,
    Overweight,
    Obesity,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::NormalWeight => "Normal weight",
            Verdict::Overweight => "Overweight",
            Verdict::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DERIVED VALUES
// ============================================================================

/// Body mass index, `weight / height²`, rounded to two decimal places.
///
/// `height` is in meters and `weight` in kilograms. Rounding uses the exact value of the
/// quotient: a quotient that only looks like a `.005` tie after scaling goes to the side it is
/// really on, and exact ties go to the even hundredth.
pub fn bmi(height: f64, weight: f64) -> f64 {
    let raw = weight / (height * height);
    let scaled = raw * 100.0;
    let rounded = if scaled - scaled.floor() == 0.5 {
        // exact residual of the scaling step
        let residual = raw.mul_add(100.0, -scaled);
        if residual > 0.0 {
            scaled.ceil()
        } else if residual < 0.0 {
            scaled.floor()
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };
    rounded / 100.0
}

/// Classifies a BMI value.
///
/// Bands are half-open: `[18.5, 25.0)` is normal weight and `[25.0, 29.9)` is overweight.
pub fn verdict(bmi: f64) -> Verdict {
    if bmi < UNDERWEIGHT_BELOW {
        Verdict::Underweight
    } else if bmi < NORMAL_WEIGHT_BELOW {
        Verdict::NormalWeight
    } else if bmi < OVERWEIGHT_BELOW {
        Verdict::Overweight
    } else {
        Verdict::Obesity
    }
}

// ============================================================================
// RAW FIELDS AND CHANGE SETS
// ============================================================================

/// Raw, unvalidated patient attributes.
///
/// This is also the exact shape of each value in the stored document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientFields {
    pub name: String,
    pub city: String,
    pub age: i64,
    pub gender: String,
    /// Height in meters.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
}

/// A sparse set of changes for a partial update. `None` means "keep the current value".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl PatientChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.height.is_none()
            && self.weight.is_none()
    }
}

// ============================================================================
// VALIDATED PATIENT
// ============================================================================

/// A validated patient record with derived BMI and verdict.
#[derive(Clone, Debug, PartialEq)]
pub struct Patient {
    id: PatientId,
    name: String,
    city: String,
    age: u8,
    gender: Gender,
    height: f64,
    weight: f64,
    bmi: f64,
    verdict: Verdict,
}

impl Patient {
    /// Validates a candidate record and computes its derived fields.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` naming the first failing field if:
    /// - age is not strictly between 0 and 120,
    /// - gender is not one of the supported values,
    /// - height or weight is not a strictly positive finite number,
    /// - height and weight together overflow the BMI.
    pub fn new(id: PatientId, fields: PatientFields) -> PatientResult<Self> {
        let PatientFields {
            name,
            city,
            age,
            gender,
            height,
            weight,
        } = fields;

        if age <= MIN_AGE_EXCLUSIVE || age >= MAX_AGE_EXCLUSIVE {
            return Err(PatientError::validation(
                "age",
                format!(
                    "must be greater than {MIN_AGE_EXCLUSIVE} and less than {MAX_AGE_EXCLUSIVE}, got {age}"
                ),
            ));
        }
        let age = u8::try_from(age)
            .map_err(|_| PatientError::validation("age", format!("out of range: {age}")))?;

        let gender = gender.parse::<Gender>()?;

        ensure_positive("height", height)?;
        ensure_positive("weight", weight)?;

        let bmi = bmi(height, weight);
        if !bmi.is_finite() {
            return Err(PatientError::validation(
                "height",
                format!("gives no finite bmi with weight {weight}, got height {height}"),
            ));
        }
        let verdict = verdict(bmi);

        Ok(Self {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
            bmi,
            verdict,
        })
    }

    /// Applies a partial update and returns the re-validated record.
    ///
    /// Fields absent from `changes` keep their current values. The identifier never changes.
    /// Derived fields are recomputed from the merged height and weight.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` if the merged record is invalid.
    pub fn merge(&self, changes: &PatientChanges) -> PatientResult<Self> {
        let current = self.fields();
        let merged = PatientFields {
            name: changes.name.clone().unwrap_or(current.name),
            city: changes.city.clone().unwrap_or(current.city),
            age: changes.age.unwrap_or(current.age),
            gender: changes.gender.clone().unwrap_or(current.gender),
            height: changes.height.unwrap_or(current.height),
            weight: changes.weight.unwrap_or(current.weight),
        };

        Patient::new(self.id.clone(), merged)
    }

    /// Returns the raw attributes, as persisted.
    pub fn fields(&self) -> PatientFields {
        PatientFields {
            name: self.name.clone(),
            city: self.city.clone(),
            age: i64::from(self.age),
            gender: self.gender.as_str().to_string(),
            height: self.height,
            weight: self.weight,
        }
    }

    pub fn id(&self) -> &PatientId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Height in meters.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Weight in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }
}

fn ensure_positive(field: &'static str, value: f64) -> PatientResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PatientError::validation(
            field,
            format!("must be a positive number, got {value}"),
        ));
    }
    Ok(())
}
