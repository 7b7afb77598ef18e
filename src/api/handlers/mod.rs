pub mod climbs;
pub mod comments;
pub mod feed;
pub mod friends;
pub mod health;
pub mod locations;
pub mod notifications;
pub mod sessions;
pub mod users;
