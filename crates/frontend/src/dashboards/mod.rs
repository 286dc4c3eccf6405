pub mod d400_economics;
pub mod d401_billing;
pub mod d402_contract_pipeline;
pub mod d403_technician_ranking;
pub mod d404_technician_portal;

pub use d400_economics::ui::EconomicsDashboard;
pub use d401_billing::ui::BillingDashboard;
pub use d402_contract_pipeline::ui::PipelineDashboard;
pub use d403_technician_ranking::ui::TechnicianRankingDashboard;
pub use d404_technician_portal::ui::TechnicianPortal;
