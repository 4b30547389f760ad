mod bid_tests;
mod job_tests;
mod page_tests;
