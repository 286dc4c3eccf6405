mod dashboard;

pub use dashboard::TechnicianRankingDashboard;
