pub mod commands;
pub mod config;
pub mod console;
pub mod consts;
pub mod exceptions;
pub mod fs;
pub mod grading;
pub mod logging;
pub mod models;
pub mod report;
pub mod service;
pub mod store;
