//! Remote store integration tests

mod http_tests;
