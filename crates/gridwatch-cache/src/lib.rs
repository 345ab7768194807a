pub mod lru;
pub mod ttl;

pub use lru::LruCache;
pub use ttl::TtlSlot;
