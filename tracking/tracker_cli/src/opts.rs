#![deny(missing_docs)]

use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use cli::args::{OutputFormatArg, UnitMeasureArg};
use cli::parsers::{elevation_parser, measurement_parser, phase_parser, range_parser, repair_type_config_parser};
use facade::elevation::{DropNumber, Elevation, ElevationName, LevelNumber};
use facade::reference::RepairTypeCode;
use rust_decimal::Decimal;
use tracking::code::RepairAddress;
use tracking::phase::Phase;
use tracking::project::RepairTypeConfig;
use tracking::repair::RepairIndex;

#[derive(Parser, Debug)]
#[command(name = "tracker_cli")]
#[command(bin_name = "tracker_cli")]
#[command(version, about, long_about = None)]
pub(crate) struct Opts {
    /// Path
    #[arg(long, default_value = ".")]
    pub(crate) path: PathBuf,

    /// Project name
    #[arg(long, value_name = "PROJECT_NAME")]
    pub(crate) project: String,

    #[command(subcommand)]
    pub(crate) command: Command,

    /// Trace log file
    #[arg(long, num_args = 0..=1, default_missing_value = "trace.log")]
    pub(crate) trace: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) verbose: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Create a project
    Create {
        /// Elevation, in facade order, e.g. 'North:5:10' for 5 drops and 10 levels
        #[arg(long, required = true, value_parser = elevation_parser, action = clap::ArgAction::Append)]
        elevation: Vec<Elevation>,

        /// Repair type, e.g. 'CR:5:m3:950' or 'CR:5:m3:950:50' for a minimum charge of 50
        #[arg(long, value_parser = repair_type_config_parser, action = clap::ArgAction::Append)]
        repair_type: Vec<RepairTypeConfig>,
    },
    /// Resolve the elevation containing a drop
    Resolve {
        /// Drop, 1-based, across all elevations
        #[arg(long)]
        drop: DropNumber,

        /// Level, checked against the levels of the elevation
        #[arg(long)]
        level: Option<LevelNumber>,
    },
    /// Show the phase status of the repairs
    Status {
        /// Repair, e.g. 'D5.L3.CR.1'
        #[arg(long, value_name = "REPAIR_CODE")]
        repair: Option<RepairAddress>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormatArg,
    },
    /// Show the repairs as a grid of levels and drops
    Grid {
        /// Only show the named elevation
        #[arg(long, value_name = "ELEVATION_NAME")]
        elevation: Option<ElevationName>,

        /// Only include repairs in the drop range, e.g. '3-7'
        #[arg(long, value_parser = range_parser)]
        drops: Option<RangeInclusive<DropNumber>>,

        /// Only include repairs in the level range, e.g. '1-4'
        #[arg(long, value_parser = range_parser)]
        levels: Option<RangeInclusive<LevelNumber>>,

        /// Only include repairs of the repair type, may be repeated
        #[arg(long, action = clap::ArgAction::Append)]
        repair_type: Vec<RepairTypeCode>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormatArg,
    },
    /// Build a repair code
    Code {
        /// Drop, 1-based, across all elevations
        #[arg(long)]
        drop: DropNumber,

        /// Level, 1-based, within the elevation
        #[arg(long)]
        level: LevelNumber,

        /// Repair type code, e.g. 'CR'
        #[arg(long)]
        repair_type: RepairTypeCode,

        /// Repair index, defaults to the index the next repair at the location would get
        #[arg(long)]
        index: Option<RepairIndex>,

        /// Measurement, e.g. 'width=100'
        #[arg(long, value_parser = measurement_parser, action = clap::ArgAction::Append)]
        measure: Vec<(String, Decimal)>,

        /// Phase, 'S', 'P<n>' or 'F', the short form of the code is built when absent
        #[arg(long, value_parser = phase_parser)]
        phase: Option<Phase>,
    },
    /// Record the survey of a new repair
    Survey {
        /// Drop, 1-based, across all elevations
        #[arg(long)]
        drop: DropNumber,

        /// Level, 1-based, within the elevation
        #[arg(long)]
        level: LevelNumber,

        /// Repair type code, e.g. 'CR'
        #[arg(long)]
        repair_type: RepairTypeCode,

        #[command(flatten)]
        submission: SubmissionArgs,
    },
    /// Record the next progress phase of a repair
    Progress {
        /// Repair, e.g. 'D5.L3.CR.1'
        #[arg(long, value_name = "REPAIR_CODE")]
        repair: RepairAddress,

        #[command(flatten)]
        submission: SubmissionArgs,
    },
    /// Record the finish phase of a repair
    Finish {
        /// Repair, e.g. 'D5.L3.CR.1'
        #[arg(long, value_name = "REPAIR_CODE")]
        repair: RepairAddress,

        #[command(flatten)]
        submission: SubmissionArgs,
    },
    /// List the repair types of the catalog
    RepairTypes {
        /// Only list repair types with the unit measure
        #[arg(long, value_enum)]
        unit_measure: Option<UnitMeasureArg>,
    },
}

#[derive(Debug, Args)]
pub(crate) struct SubmissionArgs {
    /// Author, defaults to the configured default author
    #[arg(long)]
    pub(crate) author: Option<String>,

    /// Measurement, e.g. 'width=100', unchanged measurements are taken from the latest phase
    #[arg(long, value_parser = measurement_parser, action = clap::ArgAction::Append)]
    pub(crate) measure: Vec<(String, Decimal)>,

    /// Photo file, may be repeated
    #[arg(long, action = clap::ArgAction::Append)]
    pub(crate) photo: Vec<PathBuf>,

    /// Comments
    #[arg(long)]
    pub(crate) comments: Option<String>,
}
