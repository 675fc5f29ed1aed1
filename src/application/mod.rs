pub mod cart;
pub mod catalog;
pub mod coach_service;
pub mod friends;
pub mod request_service;
pub mod session_service;
