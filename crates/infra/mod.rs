pub mod cooldown;
pub mod db;
pub mod notifications;
pub mod reviews;
