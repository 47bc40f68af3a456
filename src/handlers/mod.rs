pub mod auth;
pub mod contact;
pub mod reviews;
pub mod roles;
pub mod trips;
pub mod users;
pub mod vehicles;
