pub mod auth;
pub mod feature_service;
pub mod inventory_service;
pub mod password;
pub mod token;
