use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Single-slot time-bounded cache.
///
/// Holds at most one resident value. A stored value is logically absent once
/// its TTL elapses, even while still physically in the slot; `get` then
/// counts a miss and the caller recomputes and overwrites via `put`.
///
/// All access goes through one internal mutex; hit/miss counters are atomics
/// readable without it.
pub struct TtlSlot<T> {
    slot: Mutex<Option<(T, Instant)>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Clone> TtlSlot<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the resident value if it is still within its TTL.
    pub fn get(&self) -> Option<T> {
        let guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((value, inserted)) = guard.as_ref() {
            if inserted.elapsed() < self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(value.clone());
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Overwrite the slot and restart the TTL clock.
    pub fn put(&self, value: T) {
        let mut guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some((value, Instant::now()));
    }

    pub fn clear(&self) {
        let mut guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// Logical occupancy: 1 while a live value is resident, 0 otherwise.
    pub fn len(&self) -> usize {
        let guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some((_, inserted)) if inserted.elapsed() < self.ttl => 1,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_misses() {
        let slot: TtlSlot<String> = TtlSlot::new(Duration::from_secs(60));
        assert_eq!(slot.get(), None);
        assert_eq!(slot.misses(), 1);
        assert_eq!(slot.hits(), 0);
        assert!(slot.is_empty());
    }

    #[test]
    fn put_then_get_within_ttl() {
        let slot = TtlSlot::new(Duration::from_secs(60));
        slot.put(vec!["B1".to_string(), "B2".to_string()]);

        assert_eq!(slot.get(), Some(vec!["B1".to_string(), "B2".to_string()]));
        assert_eq!(slot.hits(), 1);
        assert_eq!(slot.len(), 1);
    }

    #[test]
    fn put_overwrites_single_slot() {
        let slot = TtlSlot::new(Duration::from_secs(60));
        slot.put("first".to_string());
        slot.put("second".to_string());

        assert_eq!(slot.get(), Some("second".to_string()));
        assert_eq!(slot.len(), 1);
    }

    #[tokio::test]
    async fn expired_value_is_logically_absent() {
        let slot = TtlSlot::new(Duration::from_millis(50));
        slot.put(42u32);
        assert_eq!(slot.get(), Some(42));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(slot.get(), None);
        assert_eq!(slot.len(), 0);
        assert_eq!(slot.hits(), 1);
        assert_eq!(slot.misses(), 1);
    }

    #[tokio::test]
    async fn put_after_expiry_restarts_ttl() {
        let slot = TtlSlot::new(Duration::from_millis(50));
        slot.put(1u32);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(slot.get(), None);

        slot.put(2u32);
        assert_eq!(slot.get(), Some(2));
    }

    #[test]
    fn clear_empties_slot() {
        let slot = TtlSlot::new(Duration::from_secs(60));
        slot.put("value".to_string());
        slot.clear();
        assert_eq!(slot.get(), None);
        assert!(slot.is_empty());
    }

    #[test]
    fn zero_ttl_never_hits() {
        let slot = TtlSlot::new(Duration::ZERO);
        slot.put(7u32);
        assert_eq!(slot.get(), None);
    }
}
