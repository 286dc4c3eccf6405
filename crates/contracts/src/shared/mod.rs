pub mod logger;
pub mod period;
