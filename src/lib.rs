pub mod archive;
pub mod config;
pub mod humanize;
pub mod observability;
pub mod rotate;
pub mod runner;
