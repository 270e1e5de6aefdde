pub mod services;
pub mod tracker;
