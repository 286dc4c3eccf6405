pub mod a001_contract;
pub mod a002_contract_file;
pub mod a003_customer;
pub mod a004_technician;
pub mod a005_service_case;
pub mod common;
