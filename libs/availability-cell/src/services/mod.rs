pub mod availability;
pub mod slot;
