pub mod auth;
pub mod calculation;
pub mod configuration;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod validators;
