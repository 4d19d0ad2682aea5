use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use cli::args::{OutputFormatArg, UnitMeasureArg};
use facade::catalog::RepairTypeCatalog;
use facade::elevation::{DropNumber, Elevation, ElevationName, LevelNumber};
use facade::reference::RepairTypeCode;
use facade::unit_measure::{Measurements, UnitMeasureType};
use futures::executor::block_on;
use itertools::Itertools;
use rust_decimal::Decimal;
use stores::photos::DirectoryPhotoStorage;
use stores::repair_types::load_repair_types;
use stores::repairs::JsonRepairStore;
use tracing::{info, warn};
use tracking::code::{full_repair_code, RepairAddress};
use tracking::collaborators::RepairPersistence;
use tracking::file::{self, build_project_file_path, build_repairs_file_path};
use tracking::grid::{build_grid, ElevationSelection, GridFilter};
use tracking::phase::{Phase, PhaseKind};
use tracking::photo::ProcessedPhoto;
use tracking::project::{Project, RepairTypeConfig};
use tracking::repair::{next_repair_index, RepairIndex, RepairRecord};
use tracking::submission::PhaseSession;

use crate::config::TrackerConfig;
use crate::opts::{Command, SubmissionArgs};
use crate::render::{build_grid_view, build_status_view, grid_text, repair_type_line, status_line};

pub(crate) fn run(command: Command, directory: &Path, project_name: &str) -> anyhow::Result<()> {
    let config = TrackerConfig::load(directory)?;
    let catalog = load_catalog(&config, directory)?;

    match command {
        Command::Create {
            elevation,
            repair_type,
        } => create_project(directory, project_name, elevation, repair_type, &catalog),
        Command::RepairTypes {
            unit_measure,
        } => {
            list_repair_types(&catalog, unit_measure);
            Ok(())
        }
        command => Tracker::open(directory, project_name, config, catalog)?.run(command),
    }
}

fn load_catalog(config: &TrackerConfig, directory: &Path) -> anyhow::Result<RepairTypeCatalog> {
    match &config.catalog {
        Some(path) => load_repair_types(&directory.join(path)),
        None => Ok(RepairTypeCatalog::builtin()),
    }
}

fn create_project(
    directory: &Path,
    name: &str,
    elevations: Vec<Elevation>,
    repair_types: Vec<RepairTypeConfig>,
    catalog: &RepairTypeCatalog,
) -> anyhow::Result<()> {
    let path = build_project_file_path(name, directory);
    if path.exists() {
        bail!("Project already exists. file: {}", path.display());
    }

    let mut project = Project::new(name.to_string(), elevations)?;
    for config in repair_types {
        catalog.require(&config.code)?;
        project.add_repair_type(config)?;
    }

    file::save(&project, &path).with_context(|| format!("Saving project. file: {}", path.display()))?;
    info!("Saved project. file: {}", path.display());

    Ok(())
}

fn list_repair_types(catalog: &RepairTypeCatalog, unit_measure: Option<UnitMeasureArg>) {
    let unit_measure = unit_measure.map(UnitMeasureType::from);

    for schema in catalog
        .iter()
        .filter(|schema| unit_measure.map_or(true, |unit_measure| schema.unit_measure == unit_measure))
    {
        println!("{}", repair_type_line(schema));
    }
}

struct Tracker {
    directory: PathBuf,
    config: TrackerConfig,
    catalog: RepairTypeCatalog,
    project: Project,
    store: JsonRepairStore,
}

impl Tracker {
    fn open(
        directory: &Path,
        name: &str,
        config: TrackerConfig,
        catalog: RepairTypeCatalog,
    ) -> anyhow::Result<Self> {
        let path = build_project_file_path(name, directory);
        let project: Project =
            file::load(&path).with_context(|| format!("Loading project. file: {}", path.display()))?;
        info!("Loaded project. name: '{}', file: {}", project.name, path.display());

        let store = JsonRepairStore::new(build_repairs_file_path(name, directory), &project);

        Ok(Self {
            directory: directory.to_path_buf(),
            config,
            catalog,
            project,
            store,
        })
    }

    fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Resolve {
                drop,
                level,
            } => {
                self.resolve(drop, level);
                Ok(())
            }
            Command::Status {
                repair,
                format,
            } => self.status(repair, format),
            Command::Grid {
                elevation,
                drops,
                levels,
                repair_type,
                format,
            } => self.grid(elevation, drops, levels, repair_type, format),
            Command::Code {
                drop,
                level,
                repair_type,
                index,
                measure,
                phase,
            } => self.code(drop, level, repair_type, index, measure, phase),
            Command::Survey {
                drop,
                level,
                repair_type,
                submission,
            } => self.submit(PhaseSession::survey(drop, level, repair_type), submission),
            Command::Progress {
                repair,
                submission,
            } => {
                let record = self.find(&repair)?;
                let next = Phase::progress(record.phases.progress.len() + 1);
                let mut session = PhaseSession::resume(record, &self.project)?;
                session.switch_phase(next);
                self.submit(session, submission)
            }
            Command::Finish {
                repair,
                submission,
            } => {
                let record = self.find(&repair)?;
                let mut session = PhaseSession::resume(record, &self.project)?;
                session.switch_phase(Phase::Finish);
                self.submit(session, submission)
            }
            Command::Create {
                ..
            }
            | Command::RepairTypes {
                ..
            } => Err(anyhow!("Command does not operate on an existing project")),
        }
    }

    fn repairs(&self) -> anyhow::Result<Vec<RepairRecord>> {
        Ok(block_on(self.store.list_repairs(&self.project.name))?)
    }

    fn find(&self, address: &RepairAddress) -> anyhow::Result<RepairRecord> {
        self.repairs()?
            .into_iter()
            .find(|record| record.address().eq(address))
            .ok_or_else(|| anyhow!("Unknown repair. repair: '{}'", address))
    }

    fn resolve(&self, drop: DropNumber, level: Option<LevelNumber>) {
        let geometry = self.project.geometry();

        let Some(elevation) = geometry.resolve(drop) else {
            println!("no-data");
            return;
        };

        match level {
            None => println!("{}", elevation.name),
            Some(level) => {
                let validity = if geometry.is_cell_valid(drop, level) { "valid" } else { "invalid" };
                println!("{} {}", elevation.name, validity);
            }
        }
    }

    fn status(&self, repair: Option<RepairAddress>, format: OutputFormatArg) -> anyhow::Result<()> {
        let repairs = match &repair {
            Some(address) => vec![self.find(address)?],
            None => self.repairs()?,
        };

        let views = repairs
            .iter()
            .filter_map(|record| {
                let view = build_status_view(record, &self.project, &self.catalog);
                if view.is_none() {
                    warn!(
                        "Skipping repair, repair type is not configured for the project. repair: '{}', repair_type: '{}'",
                        record.address(),
                        record.repair_type
                    );
                }
                view
            })
            .collect::<Vec<_>>();

        match format {
            OutputFormatArg::Text => views
                .iter()
                .for_each(|view| println!("{}", status_line(view))),
            OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&views)?),
        }

        Ok(())
    }

    fn grid(
        &self,
        elevation: Option<ElevationName>,
        drops: Option<RangeInclusive<DropNumber>>,
        levels: Option<RangeInclusive<LevelNumber>>,
        repair_types: Vec<RepairTypeCode>,
        format: OutputFormatArg,
    ) -> anyhow::Result<()> {
        let selection = elevation.map_or(ElevationSelection::All, ElevationSelection::Named);
        let filter = GridFilter {
            drops,
            levels,
            repair_types,
        };

        let repairs = self.repairs()?;
        let grid = build_grid(self.project.geometry(), &selection, &repairs, &filter)?;
        let view = build_grid_view(&grid);

        match format {
            OutputFormatArg::Text => println!("{}", grid_text(&view)),
            OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        }

        Ok(())
    }

    fn code(
        &self,
        drop: DropNumber,
        level: LevelNumber,
        repair_type: RepairTypeCode,
        index: Option<RepairIndex>,
        measure: Vec<(String, Decimal)>,
        phase: Option<Phase>,
    ) -> anyhow::Result<()> {
        let schema = self.catalog.require(&repair_type)?;

        if let Err(error) = self.project.geometry().locate(drop, level) {
            warn!("{}", error);
        }

        let measurements: Measurements = measure.into_iter().collect();
        let issues = schema.issues(&measurements);
        if !issues.is_empty() {
            warn!("Incomplete measurements. issues: [{}]", issues.iter().join(", "));
        }

        let repair_index = match index {
            Some(index) => index,
            None => next_repair_index(&self.repairs()?, &self.project.name, drop, level, &repair_type),
        };

        let phase_code = phase
            .map(|phase| phase.to_string())
            .unwrap_or_default();

        println!(
            "{}",
            full_repair_code(
                drop,
                level,
                &repair_type,
                repair_index,
                &schema.measurement_string(&measurements),
                &phase_code
            )
        );

        Ok(())
    }

    fn submit(&self, mut session: PhaseSession, args: SubmissionArgs) -> anyhow::Result<()> {
        let author = args
            .author
            .or_else(|| self.config.default_author.clone())
            .ok_or_else(|| anyhow!("An author is required, use '--author' or set 'default_author' in the tracker config"))?;

        let phase = session.phase();
        if phase.kind() == PhaseKind::Finish && !args.measure.is_empty() {
            warn!("Measurements are not recorded for the finish phase. phase: {}", phase);
        }
        for (name, value) in args.measure {
            session.set_measurement(&name, value);
        }
        if let Some(comments) = args.comments {
            session.set_comments(&comments);
        }
        for path in args.photo {
            session.add_photo(read_photo(&path)?);
        }

        let storage = DirectoryPhotoStorage::new(self.directory.join(&self.config.photo_directory));
        let folder = self.config.upload_folder(&self.project.name);

        let record = block_on(session.submit(
            &self.catalog,
            &self.project,
            &storage,
            &self.store,
            &folder,
            &author,
        ))?;

        let schema = self.catalog.require(&record.repair_type)?;
        let measurement_string = record
            .latest_measurements()
            .map(|measurements| schema.measurement_string(measurements))
            .unwrap_or_default();

        println!("{}", record.address().code(&measurement_string, Some(&phase)));

        Ok(())
    }
}

fn read_photo(path: &Path) -> anyhow::Result<ProcessedPhoto> {
    let bytes = fs::read(path).with_context(|| format!("Reading photo. file: {}", path.display()))?;
    let original_filename = path
        .file_name()
        .map(|file_name| file_name.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Photo path has no file name. path: {}", path.display()))?;

    Ok(ProcessedPhoto {
        original_filename,
        bytes,
    })
}
