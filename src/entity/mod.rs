pub mod audit_logs;
pub mod cafe_facilities;
pub mod cafe_images;
pub mod cafe_payment_methods;
pub mod cafes;
pub mod facilities;
pub mod favorites;
pub mod opening_hours;
pub mod payment_methods;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cafe_facilities::Entity as CafeFacilities;
pub use cafe_images::Entity as CafeImages;
pub use cafe_payment_methods::Entity as CafePaymentMethods;
pub use cafes::Entity as Cafes;
pub use facilities::Entity as Facilities;
pub use favorites::Entity as Favorites;
pub use opening_hours::Entity as OpeningHours;
pub use payment_methods::Entity as PaymentMethods;
pub use users::Entity as Users;
