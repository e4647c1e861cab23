pub mod cli;
pub mod config;
pub mod error;
pub mod finalizer;
pub mod importer;
pub mod interactive;
pub mod loader;
pub mod review;
pub mod session;
pub mod store;
