//! Request generation tokens
//!
//! Each activation that starts a fetch takes a new generation. A result is
//! applied only if its generation is still the newest one handed out, which
//! gives last-activation-wins regardless of completion order.

use std::cell::Cell;
use std::rc::Rc;

/// Token identifying one activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic generation counter
///
/// Clones share the same counter, so several controls can agree on which
/// activation is the newest. Not `Send`: it lives on the UI event loop.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Rc<Cell<u64>>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new activation
    pub fn advance(&self) -> Generation {
        let next = self.current.get() + 1;
        self.current.set(next);
        Generation(next)
    }

    pub fn current(&self) -> Generation {
        Generation(self.current.get())
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.current.get()
    }
}

/// What happened to a fetch result handed back to the explorer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Newest activation, store updated
    Applied,
    /// Superseded by a newer activation, discarded
    Stale,
    /// Newest activation but the fetch failed; store unchanged
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let counter = GenerationCounter::new();
        let first = counter.advance();
        let second = counter.advance();
        assert!(second > first);
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }

    #[test]
    fn test_clones_share_counter() {
        let counter = GenerationCounter::new();
        let shared = counter.clone();
        let first = counter.advance();
        shared.advance();
        assert!(!counter.is_current(first));
        assert_eq!(counter.current(), shared.current());
        assert_eq!(counter.current().value(), 2);
    }
}
