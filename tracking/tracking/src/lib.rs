pub mod code;
pub mod collaborators;
pub mod file;
pub mod grid;
pub mod phase;
pub mod photo;
pub mod project;
pub mod repair;
pub mod submission;

#[cfg(test)]
mod tests;
