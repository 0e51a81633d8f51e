pub mod cache;
pub mod country;
pub mod indicators;
pub mod portfolio;
pub mod settings;
