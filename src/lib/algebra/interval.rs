use std::fmt::Display;

use itertools::Itertools;

use crate::{algebra::BooleanAlgebra, error::SfaResult};

const MAX_CODE_POINT: u32 = char::MAX as u32;
const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);

/// A set of characters represented as sorted, disjoint, non-adjacent
/// inclusive code point intervals. Surrogate code points are never members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharPred {
    intervals: Vec<(u32, u32)>,
}

impl CharPred {
    fn from_raw(intervals: Vec<(u32, u32)>) -> Self {
        CharPred {
            intervals: normalize_intervals(intervals),
        }
    }

    pub fn empty() -> Self {
        CharPred { intervals: vec![] }
    }

    pub fn all() -> Self {
        CharPred::from_raw(vec![(0, MAX_CODE_POINT)])
    }

    pub fn char(c: char) -> Self {
        CharPred::range(c, c)
    }

    /// The characters from `lo` to `hi`, both inclusive. Empty if `lo > hi`.
    pub fn range(lo: char, hi: char) -> Self {
        CharPred::from_raw(vec![(lo as u32, hi as u32)])
    }

    pub fn of_chars(chars: impl IntoIterator<Item = char>) -> Self {
        CharPred::from_raw(chars.into_iter().map(|c| (c as u32, c as u32)).collect())
    }

    pub fn of_ranges(ranges: impl IntoIterator<Item = (char, char)>) -> Self {
        CharPred::from_raw(
            ranges
                .into_iter()
                .map(|(lo, hi)| (lo as u32, hi as u32))
                .collect(),
        )
    }

    pub fn lower_alpha() -> Self {
        CharPred::range('a', 'z')
    }

    pub fn upper_alpha() -> Self {
        CharPred::range('A', 'Z')
    }

    pub fn alpha() -> Self {
        CharPred::of_ranges([('a', 'z'), ('A', 'Z')])
    }

    pub fn num() -> Self {
        CharPred::range('0', '9')
    }

    pub fn alpha_num() -> Self {
        CharPred::of_ranges([('a', 'z'), ('A', 'Z'), ('0', '9')])
    }

    pub fn spaces() -> Self {
        CharPred::of_chars([' ', '\t', '\n', '\u{0B}', '\u{0C}', '\r'])
    }

    pub fn word() -> Self {
        CharPred::of_ranges([('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')])
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        let c = c as u32;
        // intervals are sorted, so binary search for the last one starting at or before c
        let idx = self.intervals.partition_point(|(lo, _)| *lo <= c);
        idx > 0 && self.intervals[idx - 1].1 >= c
    }

    /// Number of characters in the set.
    pub fn size(&self) -> u64 {
        self.intervals
            .iter()
            .map(|(lo, hi)| (hi - lo) as u64 + 1)
            .sum()
    }

    pub fn intervals(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.intervals
            .iter()
            .map(|(lo, hi)| (to_char(*lo), to_char(*hi)))
    }

    pub fn min_char(&self) -> Option<char> {
        self.intervals.first().map(|(lo, _)| to_char(*lo))
    }

    pub fn intersect(&self, other: &CharPred) -> CharPred {
        let mut result = vec![];
        let (mut i, mut j) = (0, 0);

        while i < self.intervals.len() && j < other.intervals.len() {
            let (a_lo, a_hi) = self.intervals[i];
            let (b_lo, b_hi) = other.intervals[j];

            let lo = a_lo.max(b_lo);
            let hi = a_hi.min(b_hi);
            if lo <= hi {
                result.push((lo, hi));
            }

            if a_hi < b_hi {
                i += 1;
            } else {
                j += 1;
            }
        }

        CharPred { intervals: result }
    }

    pub fn union(&self, other: &CharPred) -> CharPred {
        CharPred::from_raw(
            self.intervals
                .iter()
                .chain(other.intervals.iter())
                .copied()
                .collect(),
        )
    }

    pub fn complement(&self) -> CharPred {
        let mut result = vec![];
        let mut next = 0u32;

        for (lo, hi) in &self.intervals {
            if *lo > next {
                result.push((next, lo - 1));
            }
            next = hi + 1;
        }

        if next <= MAX_CODE_POINT {
            result.push((next, MAX_CODE_POINT));
        }

        CharPred::from_raw(result)
    }
}

fn to_char(code_point: u32) -> char {
    char::from_u32(code_point).expect("interval bounds are always scalar values")
}

/// Sorts and coalesces `intervals` and removes the surrogate block.
fn normalize_intervals(mut intervals: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    intervals.retain(|(lo, hi)| lo <= hi);
    intervals.sort_unstable();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(intervals.len());
    for (lo, hi) in intervals {
        match merged.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }

    let (s_lo, s_hi) = SURROGATES;
    let mut result = Vec::with_capacity(merged.len() + 1);
    for (lo, hi) in merged {
        if hi < s_lo || lo > s_hi {
            result.push((lo, hi));
            continue;
        }
        if lo < s_lo {
            result.push((lo, s_lo - 1));
        }
        if hi > s_hi {
            result.push((s_hi + 1, hi));
        }
    }

    result
}

fn fmt_char(c: char) -> String {
    match c {
        '-' | '[' | ']' | '\\' | '^' => format!("\\{c}"),
        c if c.is_alphanumeric() || c.is_ascii_punctuation() || c == ' ' => c.to_string(),
        c => c.escape_unicode().to_string(),
    }
}

impl Display for CharPred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self
            .intervals()
            .map(|(lo, hi)| {
                if lo == hi {
                    fmt_char(lo)
                } else {
                    format!("{}-{}", fmt_char(lo), fmt_char(hi))
                }
            })
            .join("");
        write!(f, "[{inner}]")
    }
}

/// The Boolean algebra of character classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharIntervalAlgebra;

impl BooleanAlgebra for CharIntervalAlgebra {
    type Pred = CharPred;
    type Symbol = char;

    fn top(&self) -> CharPred {
        CharPred::all()
    }

    fn bottom(&self) -> CharPred {
        CharPred::empty()
    }

    fn atom(&self, symbol: &char) -> CharPred {
        CharPred::char(*symbol)
    }

    fn and(&self, a: &CharPred, b: &CharPred) -> SfaResult<CharPred> {
        Ok(a.intersect(b))
    }

    fn or(&self, a: &CharPred, b: &CharPred) -> SfaResult<CharPred> {
        Ok(a.union(b))
    }

    fn not(&self, a: &CharPred) -> SfaResult<CharPred> {
        Ok(a.complement())
    }

    fn is_satisfiable(&self, p: &CharPred) -> SfaResult<bool> {
        Ok(!p.is_empty())
    }

    fn has_model(&self, p: &CharPred, symbol: &char) -> SfaResult<bool> {
        Ok(p.contains(*symbol))
    }

    fn generate_witness(&self, p: &CharPred) -> SfaResult<Option<char>> {
        Ok(p.min_char())
    }

    fn are_equivalent(&self, a: &CharPred, b: &CharPred) -> SfaResult<bool> {
        // normalized representations are canonical
        Ok(a == b)
    }
}
