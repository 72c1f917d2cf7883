pub mod subscription_store_memory;

pub use subscription_store_memory::InMemorySubscriptionStore;
