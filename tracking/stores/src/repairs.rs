use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use facade::reference::RepairTypeCode;
use tracing::{debug, info};
use tracking::collaborators::{PersistenceError, RepairPersistence};
use tracking::file;
use tracking::project::{PhaseCount, Project, ProjectId};
use tracking::repair::{RepairId, RepairPatch, RepairRecord};

/// Keeps all the repairs of a project in a single JSON file.
pub struct JsonRepairStore {
    path: PathBuf,
    phases: BTreeMap<RepairTypeCode, PhaseCount>,
    // serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonRepairStore {
    pub fn new(path: PathBuf, project: &Project) -> Self {
        let phases = project
            .repair_types
            .iter()
            .map(|config| (config.code.clone(), config.phases))
            .collect();

        Self {
            path,
            phases,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file has no repairs.
    pub fn load_all(&self) -> Result<Vec<RepairRecord>, PersistenceError> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        file::load(&self.path).map_err(|error| {
            PersistenceError::Rejected(format!("Unable to load repairs. file: {}, cause: {}", self.path.display(), error))
        })
    }

    fn save_all(&self, records: &[RepairRecord]) -> Result<(), PersistenceError> {
        file::save(records, &self.path).map_err(|error| {
            PersistenceError::Rejected(format!("Unable to save repairs. file: {}, cause: {}", self.path.display(), error))
        })
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, ()>, PersistenceError> {
        self.lock
            .lock()
            .map_err(|_| PersistenceError::Rejected("Repair store lock poisoned".to_string()))
    }

    fn insert(&self, record: &RepairRecord) -> Result<RepairId, PersistenceError> {
        let _guard = self.locked()?;
        let mut records = self.load_all()?;

        if let Some(existing) = records.iter().find(|candidate| {
            candidate.id.eq(&record.id)
                || (candidate.project_id == record.project_id && candidate.address() == record.address())
        }) {
            return Err(PersistenceError::Rejected(format!(
                "Repair already exists. id: {}, repair: '{}'",
                existing.id,
                existing.address()
            )));
        }

        records.push(record.clone());
        self.save_all(&records)?;

        info!("Created repair. id: {}, repair: '{}'", record.id, record.address());

        Ok(record.id)
    }

    fn patch(&self, id: &RepairId, patch: &RepairPatch) -> Result<(), PersistenceError> {
        let _guard = self.locked()?;
        let mut records = self.load_all()?;

        let record = records
            .iter_mut()
            .find(|candidate| candidate.id.eq(id))
            .ok_or(PersistenceError::NotFound(*id))?;

        let phases = self
            .phases
            .get(&record.repair_type)
            .copied()
            .ok_or_else(|| {
                PersistenceError::Rejected(format!(
                    "Repair type is not configured for this project. code: '{}'",
                    record.repair_type
                ))
            })?;

        record
            .apply(patch.clone(), phases)
            .map_err(|error| PersistenceError::Rejected(error.to_string()))?;

        let address = record.address();
        self.save_all(&records)?;

        info!("Updated repair. id: {}, repair: '{}'", id, address);

        Ok(())
    }
}

#[async_trait]
impl RepairPersistence for JsonRepairStore {
    async fn create_repair(&self, record: &RepairRecord) -> Result<RepairId, PersistenceError> {
        self.insert(record)
    }

    async fn update_repair(&self, id: &RepairId, patch: &RepairPatch) -> Result<(), PersistenceError> {
        self.patch(id, patch)
    }

    async fn list_repairs(&self, project_id: &ProjectId) -> Result<Vec<RepairRecord>, PersistenceError> {
        let records = self
            .load_all()?
            .into_iter()
            .filter(|record| record.project_id.eq(project_id))
            .collect::<Vec<_>>();

        debug!("Listed repairs. project: '{}', count: {}", project_id, records.len());

        Ok(records)
    }
}
