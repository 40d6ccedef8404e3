pub mod monitor;
pub mod reconciler;
pub mod scheduler;
