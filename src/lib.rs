pub mod app;
pub mod config;
pub mod errors;
pub mod lookup;
pub mod state;
pub mod storage;
pub mod uploads;
pub mod users;
