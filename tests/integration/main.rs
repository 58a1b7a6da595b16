//! Integration tests with mock HTTP server


mod caching;
mod dedup;
mod interceptors;
mod retry;
mod session;
