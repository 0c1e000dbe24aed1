pub mod plans;
pub mod qr_codes;
pub mod restaurants;
pub mod review_checks;
pub mod review_notifications;
pub mod scan_cooldowns;
pub mod scans;
pub mod subscriptions;
pub mod tables;
