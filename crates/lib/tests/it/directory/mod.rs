//! Account directory integration tests

mod api_key_tests;
mod login_tests;
mod registration_tests;
