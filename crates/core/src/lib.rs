pub mod dashboard;
pub mod error;
pub mod expiry;
pub mod item;
pub mod statistics;
pub mod timestamp;
pub mod types;
pub mod user;

pub use dashboard::{Dashboard, EmptyDashboard};
pub use error::ValidationError;
pub use expiry::{ExpiryStatus, classify};
pub use item::{Item, ItemDraft, ItemPatch, NewItem};
pub use statistics::{
    ExpiredItemCount, MonthlyWaste, Statistics, StatusSplit, TOP_EXPIRED_LIMIT, monthly_trend,
    rank_expired, status_split, top_expired,
};
pub use types::{ItemId, UserId};
pub use user::{NewUser, User, UserPatch, normalize_email};
