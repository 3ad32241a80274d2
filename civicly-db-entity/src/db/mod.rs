pub mod check_in;
pub mod message;
pub mod stake;
pub mod user;
