//! Request and response bodies.
//!
//! Bodies are strict: request types use `#[serde(deny_unknown_fields)]`, so an update body that
//! tries to carry an `id` (or a derived `bmi`) is rejected before reaching the core.

use patients_core::{Patient, PatientChanges, PatientFields};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned for every non-2xx response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

/// A patient as returned by the API, including derived values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    #[schema(example = "P001")]
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: u8,
    #[schema(example = "female")]
    pub gender: String,
    /// Height in meters.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    pub bmi: f64,
    #[schema(example = "Normal weight")]
    pub verdict: String,
}

impl From<&Patient> for PatientRes {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id().to_string(),
            name: patient.name().to_string(),
            city: patient.city().to_string(),
            age: patient.age(),
            gender: patient.gender().to_string(),
            height: patient.height(),
            weight: patient.weight(),
            bmi: patient.bmi(),
            verdict: patient.verdict().to_string(),
        }
    }
}

/// All patients keyed by identifier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientMapRes(pub BTreeMap<String, PatientRes>);

impl<'a> FromIterator<&'a Patient> for PatientMapRes {
    fn from_iter<I: IntoIterator<Item = &'a Patient>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|p| (p.id().to_string(), PatientRes::from(p)))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePatientReq {
    #[schema(example = "P001")]
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: i64,
    #[schema(example = "male")]
    pub gender: String,
    /// Height in meters.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
}

impl CreatePatientReq {
    /// Splits the request into its identifier and raw fields.
    pub fn into_parts(self) -> (String, PatientFields) {
        (
            self.id,
            PatientFields {
                name: self.name,
                city: self.city,
                age: self.age,
                gender: self.gender,
                height: self.height,
                weight: self.weight,
            },
        )
    }
}

/// Partial update. Omitted (or `null`) fields keep their current values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePatientReq {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl From<UpdatePatientReq> for PatientChanges {
    fn from(req: UpdatePatientReq) -> Self {
        PatientChanges {
            name: req.name,
            city: req.city,
            age: req.age,
            gender: req.gender,
            height: req.height,
            weight: req.weight,
        }
    }
}

/// Query string for the sort endpoint.
#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SortQuery {
    /// One of `height`, `weight`, `bmi`.
    pub sort_by: String,
    /// `asc` (default) or `desc`.
    pub order: Option<String>,
}
