//! Core engine modules for taskmgr.

pub mod actions;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod progress;
pub mod repo;
pub mod resolver;
pub mod transfer;
pub mod tree;
pub mod types;
