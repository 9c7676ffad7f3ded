//! Integration tests for Trawler
//!
//! Each test stands up wiremock servers and runs a full crawl against them.

mod crawl_tests;
