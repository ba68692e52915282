//! AccountRegistry integration tests

mod account_operations;
mod concurrency;
mod instance_operations;
