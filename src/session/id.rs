//! Identifiers for display sessions and the people acting on them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a display session within this process.
///
/// Displayed as `run-XXXXXXXX` (hex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next session ID.
    pub fn next() -> Self {
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{:08x}", self.0)
    }
}

/// Identity of a user issuing commands or pressing controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_increase() {
        let a = SessionId::next();
        let b = SessionId::next();
        assert!(b.as_u64() > a.as_u64());
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(SessionId(255).to_string(), "run-000000ff");
        assert_eq!(ActorId(42).to_string(), "42");
    }
}
