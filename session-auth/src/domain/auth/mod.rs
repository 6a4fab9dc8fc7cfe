pub mod errors;
pub mod events;
pub mod guards;
pub mod models;
pub mod ports;
pub mod providers;
pub mod registry;
