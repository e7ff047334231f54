pub mod clean;
pub mod store;
