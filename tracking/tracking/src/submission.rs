//! Collects the measurements, comments and photos for one phase of one repair and submits them.

use facade::catalog::{CatalogError, RepairTypeCatalog};
use facade::elevation::{DropNumber, LevelNumber};
use facade::geometry::GeometryError;
use facade::reference::RepairTypeCode;
use facade::repair_type::{ConversionError, RepairTypeSchema};
use facade::unit_measure::{Measurements, ValidationError};
use itertools::Itertools;
use rust_decimal::Decimal;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, trace};

use crate::code::{full_repair_code, RepairAddress};
use crate::collaborators::{PersistenceError, PhotoStorage, RepairPersistence, UploadError};
use crate::phase::{CurrentPhase, Phase, PhaseKind};
use crate::photo::{check_photo_count, upload_batch, PhotoCountError, ProcessedPhoto};
use crate::project::{Project, ProjectError};
use crate::repair::{
    next_repair_index, FinishPhase, ProgressPhase, RepairError, RepairId, RepairPatch, RepairPhases, RepairRecord,
    RepairStatus, SurveyPhase,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Invalid measurements. issues: [{}]", .0.iter().join(", "))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    PhotoCount(#[from] PhotoCountError),

    #[error(transparent)]
    Sequence(#[from] RepairError),

    #[error("Repair is already complete. repair: '{0}'")]
    AlreadyComplete(RepairAddress),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Clone, PartialEq)]
enum SessionTarget {
    NewRepair {
        drop: DropNumber,
        level: LevelNumber,
        repair_type: RepairTypeCode,
    },
    Existing(RepairRecord),
}

/// The unsubmitted state of the active phase.
///
/// Photos are owned by the session, switching phases or cancelling discards them.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSession {
    target: SessionTarget,
    phase: Phase,
    measurements: Measurements,
    comments: String,
    photos: Vec<ProcessedPhoto>,
}

impl PhaseSession {
    /// A session for the survey of a new repair.
    pub fn survey(drop: DropNumber, level: LevelNumber, repair_type: RepairTypeCode) -> Self {
        Self {
            target: SessionTarget::NewRepair {
                drop,
                level,
                repair_type,
            },
            phase: Phase::Survey,
            measurements: Measurements::new(),
            comments: String::new(),
            photos: vec![],
        }
    }

    /// A session for the current phase of an existing repair, measurements start from the latest ones recorded.
    pub fn resume(record: RepairRecord, project: &Project) -> Result<Self, SubmissionError> {
        let config = project.find_repair_type(&record.repair_type)?;

        let phase = record
            .current_phase(config.phases)
            .phase()
            .ok_or_else(|| SubmissionError::AlreadyComplete(record.address()))?;

        let measurements = record
            .latest_measurements()
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            target: SessionTarget::Existing(record),
            phase,
            measurements,
            comments: String::new(),
            photos: vec![],
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn record(&self) -> Option<&RepairRecord> {
        match &self.target {
            SessionTarget::Existing(record) => Some(record),
            SessionTarget::NewRepair {
                ..
            } => None,
        }
    }

    pub fn repair_type(&self) -> &RepairTypeCode {
        match &self.target {
            SessionTarget::Existing(record) => &record.repair_type,
            SessionTarget::NewRepair {
                repair_type, ..
            } => repair_type,
        }
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn set_measurement(&mut self, name: &str, value: Decimal) {
        self.measurements
            .insert(name.to_string(), value);
    }

    pub fn set_comments(&mut self, comments: &str) {
        self.comments = comments.to_string();
    }

    pub fn add_photo(&mut self, photo: ProcessedPhoto) {
        trace!("Added photo. phase: {}, original_filename: '{}'", self.phase, photo.original_filename);
        self.photos.push(photo);
    }

    pub fn photos(&self) -> &[ProcessedPhoto] {
        &self.photos
    }

    pub fn switch_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.photos.clear();
            self.phase = phase;
        }
    }

    pub fn cancel(&mut self) {
        self.photos.clear();
        self.measurements.clear();
        self.comments.clear();
    }

    /// The measurements that appear in the repair code, finish phases use the latest recorded ones.
    fn code_measurements(&self) -> Measurements {
        match (self.phase, self.record()) {
            (Phase::Finish, Some(record)) => record
                .latest_measurements()
                .cloned()
                .unwrap_or_default(),
            _ => self.measurements.clone(),
        }
    }

    /// Checked before anything is sent to the collaborators.
    pub fn readiness(&self, schema: &RepairTypeSchema) -> Result<(), SubmissionError> {
        let kind = self.phase.kind();

        if kind != PhaseKind::Finish {
            let issues = schema.issues(&self.measurements);
            if !issues.is_empty() {
                return Err(SubmissionError::Validation(issues));
            }
            schema.convert(&self.measurements)?;
        }

        check_photo_count(kind, self.photos.len())?;

        Ok(())
    }

    pub async fn submit<S, P>(
        &mut self,
        catalog: &RepairTypeCatalog,
        project: &Project,
        storage: &S,
        persistence: &P,
        folder: &str,
        author: &str,
    ) -> Result<RepairRecord, SubmissionError>
    where
        S: PhotoStorage + ?Sized,
        P: RepairPersistence + ?Sized,
    {
        let schema = catalog.require(self.repair_type())?;
        let config = project.find_repair_type(self.repair_type())?;

        self.readiness(schema)?;

        let (address, elevation_name) = match &self.target {
            SessionTarget::NewRepair {
                drop,
                level,
                repair_type,
            } => {
                if self.phase != Phase::Survey {
                    return Err(RepairError::PhaseOutOfSequence {
                        repair: RepairAddress {
                            drop: *drop,
                            level: *level,
                            repair_type: repair_type.clone(),
                            repair_index: 0,
                        },
                        expected: CurrentPhase::Survey,
                        requested: self.phase,
                    }
                    .into());
                }

                let elevation = project.geometry().locate(*drop, *level)?;
                let existing = persistence
                    .list_repairs(&project.name)
                    .await?;
                let repair_index = next_repair_index(&existing, &project.name, *drop, *level, repair_type);

                (
                    RepairAddress {
                        drop: *drop,
                        level: *level,
                        repair_type: repair_type.clone(),
                        repair_index,
                    },
                    elevation.name.clone(),
                )
            }
            SessionTarget::Existing(record) => {
                let expected = record.current_phase(config.phases);
                if expected.phase() != Some(self.phase) {
                    return Err(RepairError::PhaseOutOfSequence {
                        repair: record.address(),
                        expected,
                        requested: self.phase,
                    }
                    .into());
                }

                (record.address(), record.elevation_name.clone())
            }
        };

        let measurement_string = schema.measurement_string(&self.code_measurements());
        let repair_code = full_repair_code(
            address.drop,
            address.level,
            &address.repair_type,
            address.repair_index,
            &measurement_string,
            &self.phase.to_string(),
        );

        let uploaded = upload_batch(storage, folder, &repair_code, &self.photos).await?;
        let mut urls = uploaded
            .into_iter()
            .map(|photo| photo.url)
            .collect::<Vec<_>>();

        let created_at = OffsetDateTime::now_utc();
        let author = author.to_string();
        let comments = self.comments.clone();

        let record = match &self.target {
            SessionTarget::NewRepair {
                ..
            } => {
                let mut record = RepairRecord {
                    id: RepairId::new(),
                    project_id: project.name.clone(),
                    elevation_name,
                    drop: address.drop,
                    level: address.level,
                    repair_type: address.repair_type.clone(),
                    repair_index: address.repair_index,
                    status: RepairStatus::InProgress,
                    phases: RepairPhases {
                        survey: Some(SurveyPhase {
                            author,
                            created_at,
                            repair_type: address.repair_type.clone(),
                            measurements: self.measurements.clone(),
                            photos: urls,
                            comments,
                        }),
                        ..RepairPhases::default()
                    },
                };
                record.refresh_status(config.phases);

                record.id = persistence
                    .create_repair(&record)
                    .await?;

                record
            }
            SessionTarget::Existing(record) => {
                let patch = match self.phase {
                    Phase::Finish => RepairPatch::Finish(FinishPhase {
                        author,
                        created_at,
                        photos: urls,
                        comments,
                    }),
                    _ => RepairPatch::AppendProgress(ProgressPhase {
                        author,
                        created_at,
                        repair_type: record.repair_type.clone(),
                        measurements: self.measurements.clone(),
                        photo: urls
                            .pop()
                            .ok_or(PhotoCountError::NoPhotos(PhaseKind::Progress))?,
                        comments,
                    }),
                };

                let mut updated = record.clone();
                updated.apply(patch.clone(), config.phases)?;

                persistence
                    .update_repair(&record.id, &patch)
                    .await?;

                updated
            }
        };

        info!(
            "Submitted repair phase. code: '{}', phase: {}, status: {}",
            repair_code, self.phase, record.status
        );

        self.photos.clear();
        self.comments.clear();
        self.target = SessionTarget::Existing(record.clone());
        if let Some(next) = record
            .current_phase(config.phases)
            .phase()
        {
            self.phase = next;
        }

        Ok(record)
    }
}
