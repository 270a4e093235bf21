//! Alphabetic label allocation.
//!
//! Points are labeled with uppercase letters and every other element with
//! lowercase letters. After `Z` the letters double (`AA`, `BB`, … `ZZ`), then
//! triple, and so on. Counters only move forward, so a label is never issued
//! twice, even after the element that held it is removed.

use serde::{Deserialize, Serialize};

use straightedge_core::{element::ElementKind, identifier::Label};

/// Whether points and other elements share one label counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPools {
    /// Points count `A, B, C…` and other elements count `a, b, c…` independently.
    #[default]
    Separate,
    /// One counter for everything; case still follows the element kind.
    Shared,
}

/// The counter a label is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pool {
    Points,
    Structures,
}

impl Pool {
    fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Point => Pool::Points,
            ElementKind::Line
            | ElementKind::Circle
            | ElementKind::Segment
            | ElementKind::Polygon
            | ElementKind::Wedge => Pool::Structures,
        }
    }
}

/// Issues labels in a fixed, monotonic order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelAllocator {
    pools: LabelPools,
    points_issued: u64,
    structures_issued: u64,
}

impl LabelAllocator {
    pub fn new(pools: LabelPools) -> Self {
        Self {
            pools,
            points_issued: 0,
            structures_issued: 0,
        }
    }

    pub fn pools(&self) -> LabelPools {
        self.pools
    }

    /// Issues the next label for an element of `kind`.
    pub fn next_label(&mut self, kind: ElementKind) -> Label {
        let pool = Pool::for_kind(kind);
        let counter = self.counter_mut(pool);
        let index = *counter;
        *counter += 1;
        Label::new(&label_text(index, pool == Pool::Points))
    }

    /// The label [`Self::next_label`] would issue, without issuing it.
    pub fn peek(&self, kind: ElementKind) -> String {
        let pool = Pool::for_kind(kind);
        let index = match (self.pools, pool) {
            (LabelPools::Shared, _) | (LabelPools::Separate, Pool::Points) => self.points_issued,
            (LabelPools::Separate, Pool::Structures) => self.structures_issued,
        };
        label_text(index, pool == Pool::Points)
    }

    fn counter_mut(&mut self, pool: Pool) -> &mut u64 {
        match (self.pools, pool) {
            (LabelPools::Shared, _) | (LabelPools::Separate, Pool::Points) => {
                &mut self.points_issued
            }
            (LabelPools::Separate, Pool::Structures) => &mut self.structures_issued,
        }
    }
}

/// Label text for the `index`-th label of a pool.
fn label_text(index: u64, uppercase: bool) -> String {
    let alphabet = if uppercase { b'A' } else { b'a' };
    // index % 26 < 26 always fits a byte
    let letter = char::from(alphabet + (index % 26) as u8);
    let repeat = usize::try_from(index / 26 + 1).unwrap_or(usize::MAX);
    std::iter::repeat_n(letter, repeat).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(allocator: &mut LabelAllocator, kind: ElementKind, count: usize) -> Vec<String> {
        (0..count)
            .map(|_| allocator.next_label(kind).to_string())
            .collect()
    }

    #[test]
    fn test_separate_pools() {
        let mut allocator = LabelAllocator::default();
        assert_eq!(issue(&mut allocator, ElementKind::Point, 2), ["A", "B"]);
        assert_eq!(issue(&mut allocator, ElementKind::Line, 1), ["a"]);
        assert_eq!(issue(&mut allocator, ElementKind::Circle, 1), ["b"]);
        assert_eq!(issue(&mut allocator, ElementKind::Point, 1), ["C"]);
    }

    #[test]
    fn test_shared_pool_keeps_case() {
        let mut allocator = LabelAllocator::new(LabelPools::Shared);
        assert_eq!(issue(&mut allocator, ElementKind::Point, 2), ["A", "B"]);
        assert_eq!(issue(&mut allocator, ElementKind::Line, 1), ["c"]);
        assert_eq!(issue(&mut allocator, ElementKind::Point, 1), ["D"]);
    }

    #[test]
    fn test_letters_double_after_z() {
        let mut allocator = LabelAllocator::default();
        let labels = issue(&mut allocator, ElementKind::Point, 54);
        assert_eq!(labels[25], "Z");
        assert_eq!(labels[26], "AA");
        assert_eq!(labels[27], "BB");
        assert_eq!(labels[51], "ZZ");
        assert_eq!(labels[52], "AAA");
    }

    #[test]
    fn test_peek_does_not_issue() {
        let mut allocator = LabelAllocator::default();
        assert_eq!(allocator.peek(ElementKind::Wedge), "a");
        assert_eq!(allocator.peek(ElementKind::Wedge), "a");
        assert_eq!(allocator.next_label(ElementKind::Wedge), "a");
        assert_eq!(allocator.peek(ElementKind::Segment), "b");
    }
}
