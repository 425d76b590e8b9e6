use std::num::NonZeroU64;
use std::ops::Range;

/// Splits a half-open index range into consecutive chunks of at most `size`.
/// Only the last chunk may be shorter.
#[derive(Debug, Clone)]
pub struct Batches {
    next: u64,
    end: u64,
    size: u64,
}

impl Batches {
    pub fn new(range: Range<u64>, size: NonZeroU64) -> Self { Self { next: range.start, end: range.end.max(range.start), size: size.get() } }
}

impl Iterator for Batches {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.size).min(self.end);
        self.next = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next).div_ceil(self.size);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches {}
