//! Redis storage implementations.

mod token_store;

pub use token_store::RedisTokenStore;
