pub mod request_handler;
pub mod trip_handler;
pub mod trust_handler;
