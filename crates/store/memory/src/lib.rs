pub mod items;
pub mod users;

pub use items::MemoryItemStore;
pub use users::MemoryUserStore;
