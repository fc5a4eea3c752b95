pub mod health;
pub mod maps;
pub mod notifications;
pub mod weather;
