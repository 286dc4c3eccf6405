pub mod page_header;
pub mod period_selector;
pub mod podium;
pub mod stat_card;

pub use page_header::{LoadState, PageHeader};
pub use period_selector::{default_range, PeriodSelector};
pub use podium::{Podium, PodiumPlace};
pub use stat_card::{CardTone, StatCard};
