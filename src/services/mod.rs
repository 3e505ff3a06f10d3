pub mod admin_service;
pub mod auth_service;
pub mod cafe_service;
pub mod facility_service;
pub mod favorite_service;
pub mod image_service;
pub mod opening_hour_service;
pub mod payment_method_service;
pub mod user_service;
