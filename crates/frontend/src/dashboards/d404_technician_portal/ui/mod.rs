mod dashboard;

pub use dashboard::TechnicianPortal;
