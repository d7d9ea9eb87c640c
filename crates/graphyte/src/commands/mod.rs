//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod module;

pub(crate) use build::BuildArgs;
pub(crate) use module::ModuleArgs;
