pub mod ai_provider;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod processor;
pub mod report;
pub mod runner;
