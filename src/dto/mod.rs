pub mod auth;
pub mod cafes;
pub mod catalog;
pub mod favorites;
pub mod images;
pub mod opening_hours;
pub mod users;
