pub mod cli;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod indexer;
pub mod logging;
pub mod metrics;
pub mod search;
pub mod storage;
pub mod web;

pub use config::Config;
pub use search::{Backend, ResultItem, Search, SearchError};
