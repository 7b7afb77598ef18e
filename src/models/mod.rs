pub mod climb;
pub mod comment;
pub mod friendship;
pub mod location;
pub mod notification;
pub mod session;
pub mod user;
