pub mod appointments;
pub mod audit;
pub mod auth;
pub mod billing;
pub mod health;
pub mod patients;
pub mod reports;
pub mod rooms;
pub mod staff;
