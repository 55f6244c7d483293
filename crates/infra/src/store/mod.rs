//! Cache and index backends
//!
//! Both backends implement every store port: the geocode cache, the weather
//! cache and the future events index.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;
