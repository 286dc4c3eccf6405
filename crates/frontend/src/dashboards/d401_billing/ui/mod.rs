mod dashboard;

pub use dashboard::BillingDashboard;
