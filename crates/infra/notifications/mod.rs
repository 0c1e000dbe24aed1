pub mod email_api;
pub mod log_only;
