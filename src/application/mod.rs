pub mod party;
pub mod store;
