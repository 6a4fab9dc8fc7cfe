pub mod database;

pub use database::DatabaseUserProvider;
