pub mod data;
pub mod settings;
pub mod uploads;
