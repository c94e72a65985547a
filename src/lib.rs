pub mod api;
pub mod config;
pub mod console;
pub mod entity;
pub mod error;
pub mod filter;
pub mod models;
pub mod routes;
pub mod views;
