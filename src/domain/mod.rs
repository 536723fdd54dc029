pub mod assignment;
pub mod booking;
pub mod bulk;
pub mod capacity;
pub mod clock;
pub mod config;
pub mod occupancy;
pub mod quota;
pub mod scheduler;
pub mod slot;
pub mod utils;
