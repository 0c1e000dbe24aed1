pub mod review_check_statuses;
pub mod subscription_statuses;
pub mod user_roles;
