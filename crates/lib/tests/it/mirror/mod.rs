//! Mirror integration tests: where loads come from and where stores go
