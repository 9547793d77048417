//! The in-memory patient collection and the sort query over it.

use crate::patient::{Patient, PatientChanges, PatientId};
use crate::{PatientError, PatientResult};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifier to record map, kept in identifier order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientCollection {
    patients: BTreeMap<PatientId, Patient>,
}

impl PatientCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn contains(&self, id: &PatientId) -> bool {
        self.patients.contains_key(id)
    }

    pub fn get(&self, id: &PatientId) -> PatientResult<&Patient> {
        self.patients
            .get(id)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    /// Iterates records in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    /// Adds a new record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Conflict` if the identifier is already present. The collection is
    /// left unchanged.
    pub fn insert_new(&mut self, patient: Patient) -> PatientResult<()> {
        if self.patients.contains_key(patient.id()) {
            return Err(PatientError::Conflict(patient.id().to_string()));
        }
        self.patients.insert(patient.id().clone(), patient);
        Ok(())
    }

    /// Merges `changes` into an existing record and stores the result.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` for an unknown identifier, or `PatientError::Validation`
    /// if the merged record is invalid. Either way the collection is left unchanged.
    pub fn apply_changes(
        &mut self,
        id: &PatientId,
        changes: &PatientChanges,
    ) -> PatientResult<&Patient> {
        let existing = self
            .patients
            .get_mut(id)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))?;
        *existing = existing.merge(changes)?;
        Ok(&*existing)
    }

    /// Removes and returns a record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if the identifier is unknown.
    pub fn remove(&mut self, id: &PatientId) -> PatientResult<Patient> {
        self.patients
            .remove(id)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    /// Returns all records ordered by `field`.
    ///
    /// Records with equal keys keep identifier order.
    pub fn sorted_by(&self, field: SortField, order: SortOrder) -> Vec<Patient> {
        let mut patients: Vec<Patient> = self.patients.values().cloned().collect();
        patients.sort_by(|a, b| {
            let ordering = field.key(a).total_cmp(&field.key(b));
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        patients
    }
}

impl FromIterator<Patient> for PatientCollection {
    fn from_iter<I: IntoIterator<Item = Patient>>(iter: I) -> Self {
        Self {
            patients: iter.into_iter().map(|p| (p.id().clone(), p)).collect(),
        }
    }
}

impl IntoIterator for PatientCollection {
    type Item = Patient;
    type IntoIter = std::collections::btree_map::IntoValues<PatientId, Patient>;

    fn into_iter(self) -> Self::IntoIter {
        self.patients.into_values()
    }
}

// ============================================================================
// SORTING
// ============================================================================

/// Fields a collection can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Height, SortField::Weight, SortField::Bmi];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Height => "height",
            SortField::Weight => "weight",
            SortField::Bmi => "bmi",
        }
    }

    fn key(self, patient: &Patient) -> f64 {
        match self {
            SortField::Height => patient.height(),
            SortField::Weight => patient.weight(),
            SortField::Bmi => patient.bmi(),
        }
    }
}

impl FromStr for SortField {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            _ => Err(PatientError::validation(
                "sort_by",
                format!("'{s}' is not one of height, weight, bmi"),
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(PatientError::validation(
                "order",
                format!("'{s}' is not one of asc, desc"),
            )),
        }
    }
}
