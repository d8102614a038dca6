//! Monotonic counter used to synthesize element ids.

/// Process-scoped sequence. The first value handed out is 1.
#[derive(Debug, Clone, Default)]
pub struct SequenceAllocator {
    last: u64,
}

impl SequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the next number.
    pub fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// Last number handed out (0 if none yet).
    pub fn current(&self) -> u64 {
        self.last
    }

    /// Next id string with the given prefix, e.g. `tag-7`.
    pub fn next_id(&mut self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next())
    }

    /// Restart from zero. Only meant for test isolation.
    pub fn reset(&mut self) {
        self.last = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let mut seq = SequenceAllocator::new();
        assert_eq!(seq.current(), 0);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
        assert_eq!(seq.next_id("tag-"), "tag-3");
        assert_eq!(seq.current(), 3);
    }

    #[test]
    fn test_reset() {
        let mut seq = SequenceAllocator::new();
        seq.next();
        seq.reset();
        assert_eq!(seq.next(), 1);
    }
}
