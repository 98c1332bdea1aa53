pub mod app_state;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod directory;
