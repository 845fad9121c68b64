pub mod app;
pub mod cache;
pub mod config;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod model;
pub mod persist;
pub mod state;
pub mod timer;
pub mod tui;
pub mod ui;
pub mod validate;
