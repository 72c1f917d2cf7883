pub mod factory;
pub mod subscription_repository;

pub use factory::Repositories;
