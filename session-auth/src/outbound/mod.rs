pub mod events;
pub mod request;
pub mod stores;
