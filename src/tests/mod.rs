mod crawl_tests;
mod utils;
