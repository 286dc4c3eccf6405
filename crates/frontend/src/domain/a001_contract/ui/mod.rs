pub mod files_panel;
pub mod list;

pub use files_panel::FilesPanel;
pub use list::ContractList;
