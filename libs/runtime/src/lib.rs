//! Process-level plumbing shared by Turnstile binaries: layered configuration
//! and logging bootstrap.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{
    AppConfig, CliArgs, DatabaseConfig, FacilityConfig, LoggingConfig, MemberSeed, Section,
    ServerConfig,
};
