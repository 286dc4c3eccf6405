pub mod api;
pub mod download;
pub mod hook;
pub mod store;
pub mod subscription;
pub mod ui;
