pub mod audit;
pub mod store;
pub mod traits;
pub mod types;
