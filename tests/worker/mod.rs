//! Tests against a live Valkey/Redis server on `127.0.0.1:6379`.

mod pool;
mod queue;
mod rate_limit;
