pub mod attendance;
pub mod closed_date;
pub mod reservation;
pub mod settings;
pub mod slot;
