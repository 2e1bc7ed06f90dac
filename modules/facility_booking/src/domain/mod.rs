pub mod availability;
pub mod error;
pub mod ports;
pub mod repo;
pub mod service;
pub mod settings;
pub mod token;
