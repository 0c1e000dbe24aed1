pub mod activity;
pub mod cooldown_sweeper;
pub mod plans;
pub mod qr_codes;
pub mod restaurants;
pub mod scans;
pub mod subscriptions;
pub mod tables;
