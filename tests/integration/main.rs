//! Integration tests against an in-memory database

mod common;
mod lending;
mod sessions;
