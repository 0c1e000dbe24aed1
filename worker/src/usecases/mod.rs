pub mod maintenance;
pub mod review_attribution;
