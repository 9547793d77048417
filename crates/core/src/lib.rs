//! # Patients Core
//!
//! Core business logic for the patient records service.
//!
//! This crate contains pure data operations:
//! - Patient validation and the derived BMI/verdict values
//! - Partial updates that always re-derive computed values
//! - Whole-document JSON persistence behind the [`RecordStore`] trait
//!
//! **No API concerns**: HTTP servers and wire formats belong in `api-rest` and `api-shared`.

pub mod collection;
pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod service;
pub mod store;

pub use collection::{PatientCollection, SortField, SortOrder};
pub use config::CoreConfig;
pub use constants::DEFAULT_PATIENT_DATA_FILE;
pub use error::{PatientError, PatientResult};
pub use patient::{bmi, verdict, Gender, Patient, PatientChanges, PatientFields, PatientId, Verdict};
pub use service::PatientService;
pub use store::{InMemoryStore, JsonFileStore, RecordStore};
