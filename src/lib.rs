pub mod auth;
pub mod config;
pub mod docparse;
pub mod error;
pub mod routes;
