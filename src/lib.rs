pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod session;
pub mod stats;
pub mod ui;
pub mod view;
