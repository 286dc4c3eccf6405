//! Общие типы frontend и backend: агрегаты, DTO, запросы и ответы дашбордов

pub mod dashboards;
pub mod domain;
pub mod shared;
pub mod system;
