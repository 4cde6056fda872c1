use crate::variants::VariantIndex;

/// A half-open interval of sites.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IntervalSegment {
    pub start: VariantIndex,
    pub end: VariantIndex,
}

impl IntervalSegment {
    pub fn new(start: VariantIndex, end: VariantIndex) -> Self {
        debug_assert!(start < end);
        Self { start, end }
    }
}

/// An append-only list of disjoint site intervals in increasing order.
/// Used for the live-segment accounting of the tree sequence builder:
/// appending coalesces with the tail, and covered regions can be subtracted
/// once a younger descendant shadows them.
#[derive(Clone, Debug, Default)]
pub struct SegmentList {
    segments: Vec<IntervalSegment>,
}

impl SegmentList {
    /// Create an empty segment list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interval. Intervals must be appended in increasing order;
    /// an interval adjacent to the current tail extends it instead of
    /// starting a new segment.
    pub fn append(&mut self, start: VariantIndex, end: VariantIndex) {
        debug_assert!(start < end);
        match self.segments.last_mut() {
            Some(last) if last.end == start => last.end = end,
            _ => {
                debug_assert!(self
                    .segments
                    .last()
                    .map(|last| last.end < start)
                    .unwrap_or(true));
                self.segments.push(IntervalSegment::new(start, end));
            }
        }
    }

    /// Remove `[start, end)` from the list, splitting segments that straddle
    /// the boundary.
    pub fn subtract(&mut self, start: VariantIndex, end: VariantIndex) {
        if self.segments.is_empty() || start >= end {
            return;
        }

        let mut result = Vec::with_capacity(self.segments.len() + 1);
        for segment in &self.segments {
            if segment.end <= start || segment.start >= end {
                result.push(*segment);
                continue;
            }
            if segment.start < start {
                result.push(IntervalSegment::new(segment.start, start));
            }
            if segment.end > end {
                result.push(IntervalSegment::new(end, segment.end));
            }
        }
        self.segments = result;
    }

    /// Remove all segments, keeping the allocation.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Whether any segment contains the given site.
    pub fn contains(&self, site: VariantIndex) -> bool {
        self.segments
            .iter()
            .any(|segment| segment.start <= site && site < segment.end)
    }

    /// Iterate over the segments in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = &IntervalSegment> + '_ {
        self.segments.iter()
    }

    /// The number of segments in the list.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the list holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(intervals: &[(usize, usize)]) -> SegmentList {
        let mut list = SegmentList::new();
        for &(start, end) in intervals {
            list.append(VariantIndex(start), VariantIndex(end));
        }
        list
    }

    #[test]
    fn append_coalesces_adjacent() {
        let list = list(&[(0, 2), (2, 5), (7, 9)]);
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.iter().copied().collect::<Vec<_>>(),
            [
                IntervalSegment::new(VariantIndex(0), VariantIndex(5)),
                IntervalSegment::new(VariantIndex(7), VariantIndex(9)),
            ]
        );
    }

    #[test]
    fn subtract_splits_and_trims() {
        let mut segments = list(&[(0, 10)]);
        segments.subtract(VariantIndex(3), VariantIndex(5));
        assert_eq!(
            segments.iter().copied().collect::<Vec<_>>(),
            [
                IntervalSegment::new(VariantIndex(0), VariantIndex(3)),
                IntervalSegment::new(VariantIndex(5), VariantIndex(10)),
            ]
        );

        segments.subtract(VariantIndex(0), VariantIndex(4));
        assert_eq!(
            segments.iter().copied().collect::<Vec<_>>(),
            [
                IntervalSegment::new(VariantIndex(5), VariantIndex(10)),
            ]
        );

        segments.subtract(VariantIndex(5), VariantIndex(10));
        assert!(segments.is_empty());
    }

    #[test]
    fn contains_respects_bounds() {
        let segments = list(&[(2, 4)]);
        assert!(!segments.contains(VariantIndex(1)));
        assert!(segments.contains(VariantIndex(2)));
        assert!(segments.contains(VariantIndex(3)));
        assert!(!segments.contains(VariantIndex(4)));
    }
}
