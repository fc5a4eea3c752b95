pub mod aggregate;
pub mod cache;
pub mod openweather;
pub mod snapshot;
pub mod weather;
