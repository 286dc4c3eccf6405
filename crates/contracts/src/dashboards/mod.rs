pub mod d400_economics;
pub mod d401_billing;
pub mod d402_contract_pipeline;
pub mod d403_technician_ranking;
pub mod d404_technician_portal;
