mod dashboard;

pub use dashboard::EconomicsDashboard;
