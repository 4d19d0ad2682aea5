pub mod fixtures {
    use facade::elevation::{DropNumber, LevelNumber};
    use facade::reference::RepairTypeCode;
    use facade::test::north_and_south_geometry;
    use facade::unit_measure::Measurements;
    use rust_decimal_macros::dec;
    use time::macros::datetime;
    use time::OffsetDateTime;

    use crate::project::{PhaseCount, Project, RepairTypeConfig};
    use crate::repair::{
        FinishPhase, ProgressPhase, RepairId, RepairIndex, RepairPhases, RepairRecord, RepairStatus, SurveyPhase,
    };

    pub const CR: &str = "CR";
    pub const PROJECT: &str = "tower";
    pub const AUTHOR: &str = "ada";

    pub fn created_at() -> OffsetDateTime {
        datetime!(2026-03-02 09:30 UTC)
    }

    pub fn phases(total_phases: u8) -> PhaseCount {
        PhaseCount::try_from(total_phases).unwrap()
    }

    pub fn measurements(values: &[(&str, rust_decimal::Decimal)]) -> Measurements {
        values
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    pub fn survey(repair_type: &str) -> SurveyPhase {
        SurveyPhase {
            author: AUTHOR.to_string(),
            created_at: created_at(),
            repair_type: RepairTypeCode::from_raw_str(repair_type),
            measurements: measurements(&[("width", dec!(100)), ("height", dec!(100))]),
            photos: vec!["photos/survey.jpg".to_string()],
            comments: String::new(),
        }
    }

    pub fn progress() -> ProgressPhase {
        ProgressPhase {
            author: AUTHOR.to_string(),
            created_at: created_at(),
            repair_type: RepairTypeCode::from_raw_str(CR),
            measurements: measurements(&[("width", dec!(120)), ("height", dec!(110))]),
            photo: "photos/progress.jpg".to_string(),
            comments: String::new(),
        }
    }

    pub fn finish() -> FinishPhase {
        FinishPhase {
            author: AUTHOR.to_string(),
            created_at: created_at(),
            photos: vec!["photos/finish.jpg".to_string()],
            comments: "cured".to_string(),
        }
    }

    /// A surveyed repair in the `tower` project, see [`north_and_south_geometry`].
    pub fn record_at(drop: DropNumber, level: LevelNumber, repair_type: &str, repair_index: RepairIndex) -> RepairRecord {
        let elevation_name = north_and_south_geometry()
            .resolve(drop)
            .map(|elevation| elevation.name.clone())
            .unwrap_or_else(|| facade::geometry::NO_DATA.to_string());

        RepairRecord {
            id: RepairId::new(),
            project_id: PROJECT.to_string(),
            elevation_name,
            drop,
            level,
            repair_type: RepairTypeCode::from_raw_str(repair_type),
            repair_index,
            status: RepairStatus::InProgress,
            phases: RepairPhases {
                survey: Some(survey(repair_type)),
                progress: vec![],
                finish: None,
            },
        }
    }

    /// `CR` with 3 phases and `PR` with 4 phases.
    pub fn project() -> Project {
        let mut project = Project::new(PROJECT.to_string(), facade::test::north_and_south()).unwrap();
        project
            .add_repair_type(RepairTypeConfig::new(
                RepairTypeCode::from_raw_str(CR),
                phases(3),
                "m3".to_string(),
                dec!(950),
            ))
            .unwrap();
        project
            .add_repair_type(RepairTypeConfig::new(
                RepairTypeCode::from_raw_str("PR"),
                phases(4),
                "m2".to_string(),
                dec!(85),
            ))
            .unwrap();
        project
    }
}
