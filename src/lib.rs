pub mod candidates;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod conversion;
pub mod ephemeris;
pub mod errors;
pub mod horizon;
pub mod planner;
pub mod report;
pub mod time;
pub mod visibility;
