//! Configuration repositories.

mod document;
mod local;

pub use document::{ModuleSpec, StaticConfigurationRepository};
pub use local::LocalConfigurationRepository;
