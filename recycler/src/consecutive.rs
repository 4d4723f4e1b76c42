/// An inclusive range `[start_index, end_index]` of item indices.
///
/// Index windows are consecutive everywhere in this engine, so ranges are
/// passed around as two bounds instead of materialized arrays. Bounds are
/// signed so the empty sentinel and "no item matched" probes are
/// representable; all elements yielded by iteration are valid `usize`
/// indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsecutiveNumbers {
    pub start_index: i64,
    pub end_index: i64,
}

impl ConsecutiveNumbers {
    pub const EMPTY: ConsecutiveNumbers = ConsecutiveNumbers {
        start_index: -1,
        end_index: -2,
    };

    pub fn new(start_index: i64, end_index: i64) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    /// Builds a range from unsigned bounds, both inclusive.
    pub fn from_bounds(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index: start_index as i64,
            end_index: end_index as i64,
        }
    }

    pub fn len(&self) -> usize {
        (self.end_index - self.start_index + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end_index < self.start_index
    }

    /// Element at position `offset` within the range.
    pub fn at(&self, offset: usize) -> Option<usize> {
        if offset < self.len() {
            Some((self.start_index + offset as i64) as usize)
        } else {
            None
        }
    }

    pub fn first(&self) -> Option<usize> {
        self.at(0)
    }

    pub fn last(&self) -> Option<usize> {
        self.len().checked_sub(1).and_then(|i| self.at(i))
    }

    pub fn includes(&self, value: usize) -> bool {
        let value = value as i64;
        value >= self.start_index && value <= self.end_index
    }

    /// Position of `value` within the range, or `None` if not included.
    pub fn index_of(&self, value: usize) -> Option<usize> {
        if self.includes(value) {
            Some((value as i64 - self.start_index) as usize)
        } else {
            None
        }
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Sub-range `[start, end)` by position, clamped to the range length.
    pub fn slice(&self, start: usize, end: usize) -> ConsecutiveNumbers {
        let new_start = self.start_index + start as i64;
        let new_end = self.start_index + end.min(self.len()) as i64 - 1;
        ConsecutiveNumbers {
            start_index: new_start,
            end_index: new_end.max(new_start - 1),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + use<> {
        let (start, end) = if self.is_empty() {
            (0, 0)
        } else {
            (self.start_index as usize, self.end_index as usize + 1)
        };
        start..end
    }
}

impl IntoIterator for ConsecutiveNumbers {
    type Item = usize;
    type IntoIter = std::ops::Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        if self.is_empty() {
            0..0
        } else {
            self.start_index as usize..self.end_index as usize + 1
        }
    }
}

impl IntoIterator for &ConsecutiveNumbers {
    type Item = usize;
    type IntoIter = std::ops::Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        (*self).into_iter()
    }
}
