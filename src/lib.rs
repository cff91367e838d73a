pub mod app;
pub mod calendar;
pub mod config;
pub mod db;
pub mod http_client;
pub mod logging;
pub mod roster;
pub mod schedule;
pub mod schedule_import;
pub mod state;
pub mod stats_fetch;
