mod dashboard;

pub use dashboard::PipelineDashboard;
