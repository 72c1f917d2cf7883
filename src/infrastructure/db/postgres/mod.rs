mod database;
pub mod subscription_store_postgres;

pub use database::PostgresDatabase;
