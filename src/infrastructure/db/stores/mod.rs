pub mod subscription_store;
