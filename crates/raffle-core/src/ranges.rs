//! Inclusive integer ranges of raffle numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RaffleError, RaffleResult};

/// An inclusive range `[start, end]` of ticket numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NumberRange {
    pub start: u64,
    pub end: u64,
}

impl NumberRange {
    /// Build a range, rejecting `start < 1` and `start > end`.
    pub fn new(start: u64, end: u64) -> RaffleResult<Self> {
        if start < 1 {
            return Err(RaffleError::validation("range start must be at least 1"));
        }
        if start > end {
            return Err(RaffleError::validation(format!(
                "range start {start} is greater than range end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of values in the range.
    pub fn count(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn contains(&self, n: u64) -> bool {
        self.start <= n && n <= self.end
    }

    pub fn overlaps(&self, other: &NumberRange) -> bool {
        other.start <= self.end && other.end >= self.start
    }

    pub fn intersection(&self, other: &NumberRange) -> Option<NumberRange> {
        self.overlaps(other).then(|| NumberRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

impl fmt::Display for NumberRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// The existing range with the lowest start that overlaps `candidate`.
pub fn first_conflict<I>(candidate: &NumberRange, existing: I) -> Option<NumberRange>
where
    I: IntoIterator<Item = NumberRange>,
{
    existing
        .into_iter()
        .filter(|r| r.overlaps(candidate))
        .min_by_key(|r| (r.start, r.end))
}

/// Sort and merge ranges into a disjoint, ascending list.
pub fn merge(ranges: impl IntoIterator<Item = NumberRange>) -> Vec<NumberRange> {
    let mut sorted: Vec<NumberRange> = ranges.into_iter().collect();
    sorted.sort();

    let mut merged: Vec<NumberRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if range.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// How many numbers of `within` are covered by the union of `ranges`.
pub fn covered_count(ranges: impl IntoIterator<Item = NumberRange>, within: &NumberRange) -> u64 {
    merge(ranges)
        .iter()
        .filter_map(|r| r.intersection(within))
        .map(|r| r.count())
        .sum()
}

/// The parts of `within` not covered by any of `ranges`, ascending.
pub fn complement(ranges: impl IntoIterator<Item = NumberRange>, within: &NumberRange) -> Vec<NumberRange> {
    let mut gaps = Vec::new();
    let mut cursor = within.start;
    for r in merge(ranges).iter().filter_map(|r| r.intersection(within)) {
        if r.start > cursor {
            gaps.push(NumberRange {
                start: cursor,
                end: r.start - 1,
            });
        }
        cursor = r.end.saturating_add(1);
        if cursor > within.end {
            return gaps;
        }
    }
    if cursor <= within.end {
        gaps.push(NumberRange {
            start: cursor,
            end: within.end,
        });
    }
    gaps
}
