pub mod app;
pub mod backend;
pub mod commands;
pub mod error;
pub mod manifest;
pub mod reconcile;
pub mod resources;
pub mod runtime;
