pub mod aggregation;
pub mod config;
pub mod data;
pub mod error;
pub mod esign;
pub mod events;
pub mod format;
pub mod logger;
pub mod storage;
