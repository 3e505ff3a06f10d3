pub mod audit;
pub mod config;
pub mod db;
pub mod directory;
pub mod dto;
pub mod entity;
pub mod error;
pub mod favorites;
pub mod geo;
pub mod middleware;
pub mod models;
pub mod opening_hours;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod uploads;
