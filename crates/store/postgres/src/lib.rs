pub mod config;
pub mod items;
pub mod migrations;
pub mod pool;
pub mod stats;
pub mod users;

pub use config::PostgresConfig;
pub use items::PostgresItemStore;
pub use pool::connect;
pub use stats::PostgresStatisticsStore;
pub use users::PostgresUserStore;
