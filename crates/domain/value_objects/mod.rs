pub mod enums;
pub mod plans;
pub mod qr_codes;
pub mod redirects;
pub mod restaurants;
pub mod review_checks;
pub mod reviews;
pub mod scans;
pub mod subscriptions;
pub mod tables;
