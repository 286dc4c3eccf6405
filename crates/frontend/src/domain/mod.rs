pub mod a001_contract;
