//! Configuration and dependency initialization.
//!
//! [`Config`] is read once per process from environment variables and passed
//! explicitly to [`Dependencies::new`], which wires every pipeline component.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::Config;
