pub mod subscription;

pub use subscription::SubscriptionRow;
