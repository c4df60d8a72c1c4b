pub mod auth;
pub mod features;
pub mod health;
pub mod inventory;
