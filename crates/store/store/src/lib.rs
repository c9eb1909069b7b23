pub mod error;
pub mod items;
pub mod stats;
pub mod testing;
pub mod users;

pub use error::StoreError;
pub use items::ItemStore;
pub use stats::{InMemoryStatistics, StatisticsStore};
pub use users::UserStore;
