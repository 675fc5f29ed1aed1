pub mod backend;
pub mod cart;
pub mod coach;
pub mod error;
pub mod friend;
pub mod request;
pub mod session;
