pub mod access;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod predicate;
pub mod stats;
pub mod storage;
