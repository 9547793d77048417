//! Patient service.
//!
//! Every operation is a full load-modify-save cycle against the injected [`RecordStore`].
//! Mutations hold a writer lock shared by all clones of the service, so two requests in the
//! same process never interleave their load and save. Nothing is saved when an operation fails.

use crate::collection::{PatientCollection, SortField, SortOrder};
use crate::patient::{Patient, PatientChanges, PatientFields, PatientId};
use crate::store::{JsonFileStore, RecordStore};
use crate::{CoreConfig, PatientError, PatientResult};
use std::sync::{Arc, Mutex, MutexGuard};

/// Pure patient data operations - no API concerns
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn RecordStore>,
    write_lock: Arc<Mutex<()>>,
}

impl PatientService {
    /// Creates a service over the given store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a service backed by the JSON file named in `cfg`.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(Arc::new(JsonFileStore::new(cfg.patient_data_file())))
    }

    /// Returns every patient, keyed by identifier.
    pub fn list(&self) -> PatientResult<PatientCollection> {
        self.store.load()
    }

    /// Returns one patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if the identifier is unknown.
    pub fn get(&self, id: &PatientId) -> PatientResult<Patient> {
        self.store.load()?.get(id).cloned()
    }

    /// Returns every patient ordered by `field`.
    pub fn sorted(&self, field: SortField, order: SortOrder) -> PatientResult<Vec<Patient>> {
        Ok(self.store.load()?.sorted_by(field, order))
    }

    /// Validates and stores a new patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the fields fail validation (`Validation`),
    /// - the identifier already exists (`Conflict`),
    /// - the document cannot be loaded or saved.
    pub fn create(&self, id: PatientId, fields: PatientFields) -> PatientResult<Patient> {
        let patient = Patient::new(id, fields)?;

        let _guard = self.lock()?;
        let mut patients = self.store.load()?;
        patients.insert_new(patient.clone())?;
        self.store.save(&patients)?;

        tracing::info!("created patient {}", patient.id());
        Ok(patient)
    }

    /// Applies a partial update to an existing patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the identifier is unknown (`NotFound`),
    /// - the merged record fails validation (`Validation`),
    /// - the document cannot be loaded or saved.
    pub fn update(&self, id: &PatientId, changes: &PatientChanges) -> PatientResult<Patient> {
        let _guard = self.lock()?;
        let mut patients = self.store.load()?;
        let updated = patients.apply_changes(id, changes)?.clone();
        self.store.save(&patients)?;

        tracing::info!("updated patient {}", id);
        Ok(updated)
    }

    /// Removes a patient and returns the removed record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if the identifier is unknown, or a store error if the
    /// document cannot be loaded or saved.
    pub fn delete(&self, id: &PatientId) -> PatientResult<Patient> {
        let _guard = self.lock()?;
        let mut patients = self.store.load()?;
        let removed = patients.remove(id)?;
        self.store.save(&patients)?;

        tracing::info!("deleted patient {}", id);
        Ok(removed)
    }

    fn lock(&self) -> PatientResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| PatientError::StoreUnavailable("patient writer lock poisoned".into()))
    }
}
