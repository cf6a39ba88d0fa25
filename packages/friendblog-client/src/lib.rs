pub mod bus;
pub mod follow;
pub mod gateway;
pub mod notifications;
pub mod posts;
pub mod session;
pub mod toast;

pub use bus::{Signal, SignalBus};
pub use follow::{FollowRequestCounter, FollowRequests, RequestCountSource, next_delay};
pub use gateway::Gateway;
pub use notifications::{NotificationChannel, extract_notification_list};
pub use posts::PostFeed;
pub use session::SessionStore;
pub use toast::{Toast, ToastLevel, ToastQueue};
