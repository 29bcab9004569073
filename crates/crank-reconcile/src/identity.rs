//! Local identity allocation.
//!
//! Some resources have no server-assigned identity — VCS tokens are keyed
//! by platform, and list projections have no id at all. The host store
//! still needs a stable token per declared resource; [`IdentityAllocator`]
//! produces one. The token is purely local bookkeeping and is never sent to
//! the server.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crank_domain::LocalId;

/// Allocates process-unique local identity tokens.
///
/// One explicit counter object, initialised to zero, with no teardown
/// requirement. Share a single allocator (by reference or `Arc`) across all
/// callers in a process: within one process lifetime no two `allocate`
/// calls return the same token, even under concurrent invocation.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    counter: AtomicU64,
}

impl IdentityAllocator {
    pub const fn new() -> Self {
        Self { counter: AtomicU64::new(0) }
    }

    /// Returns a fresh token: a UTC timestamp prefix (microsecond
    /// resolution, for human readability) followed by the counter value.
    /// Uniqueness comes from the counter alone.
    pub fn allocate(&self) -> LocalId {
        let count = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        LocalId::from_parts(Utc::now().format("%Y%m%d%H%M%S%6f"), count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn tokens_increase_with_the_counter() {
        let allocator = IdentityAllocator::new();
        let first = allocator.allocate();
        let second = allocator.allocate();
        assert_ne!(first, second);
        assert!(first.as_str().ends_with("00001"));
        assert!(second.as_str().ends_with("00002"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_allocations_never_collide() {
        const CALLS: usize = 1000;
        let allocator = Arc::new(IdentityAllocator::new());
        let handles: Vec<_> = (0..CALLS)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                tokio::spawn(async move { allocator.allocate() })
            })
            .collect();

        let mut tokens = HashSet::new();
        for handle in handles {
            tokens.insert(handle.await.unwrap());
        }
        assert_eq!(tokens.len(), CALLS);
    }
}
