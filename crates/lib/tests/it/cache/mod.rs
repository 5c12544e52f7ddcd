//! Local cache integration tests

mod file_cache_tests;
