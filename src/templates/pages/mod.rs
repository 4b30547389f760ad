pub mod home;
pub mod job;

pub use home::{home_page, HomeVm};
pub use job::job_page;
