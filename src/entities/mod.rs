pub mod contact_message;
pub mod review;
pub mod role;
pub mod trip;
pub mod trip_passenger;
pub mod user;
pub mod vehicle;
