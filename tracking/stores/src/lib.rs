/// Stores are the local implementations of the collaborators used by the tracker.
///
/// Currently, all stores are just simple files, CSV for reference data and JSON for repairs.
///
/// Example store backends:
/// * Files (e.g. CSV).
/// * Remote (e.g. REST, signed photo uploads).
/// * Databases.
pub mod photos;
pub mod repair_types;
pub mod repairs;
