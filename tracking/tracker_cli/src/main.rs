use clap::Parser;
use tracing::trace;

use crate::opts::Opts;

mod commands;
mod config;
mod opts;
mod render;

fn main() -> anyhow::Result<()> {
    let args = argfile::expand_args(argfile::parse_fromfile, argfile::PREFIX)?;

    let opts = Opts::parse_from(args);

    cli::tracing::configure_tracing(opts.trace.clone(), opts.verbose.clone())?;

    trace!("Running command. path: {}, project: '{}'", opts.path.display(), opts.project);

    commands::run(opts.command, &opts.path, &opts.project)
}
