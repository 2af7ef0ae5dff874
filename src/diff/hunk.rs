use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{self, char},
    combinator::opt,
    sequence::preceded,
};
use std::fmt;

use super::LineRange;

/// One side of a hunk header, e.g. `136,0` or `137`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u32,
    /// `None` when git omitted the count
    pub count: Option<u32>,
}

/// A parsed `@@ -old +new @@` hunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old: RangeSpec,
    pub new: RangeSpec,
}

impl HunkHeader {
    /// Parse a hunk header line.
    ///
    /// Anything after the closing `@@` (git's function context) is ignored.
    /// Returns `None` for anything that is not a well-formed header.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        header(line).ok().map(|(_, header)| header)
    }

    /// The inclusive range of new-file lines this hunk touches.
    ///
    /// An absent count yields a single-line range at `start`; otherwise the
    /// range spans `start..=start + count`. A start of zero only appears when
    /// every line was deleted, so there is nothing to report against.
    #[must_use]
    pub fn changed_range(&self) -> Option<LineRange> {
        let RangeSpec { start, count } = self.new;
        let end = start.checked_add(count.unwrap_or(0))?;
        LineRange::new(start, end)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(count) => write!(f, "{},{}", self.start, count),
            None => write!(f, "{}", self.start),
        }
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@@ -{} +{} @@", self.old, self.new)
    }
}

fn range_spec(input: &str) -> IResult<&str, RangeSpec> {
    (complete::u32, opt(preceded(char(','), complete::u32)))
        .map(|(start, count)| RangeSpec { start, count })
        .parse(input)
}

fn header(input: &str) -> IResult<&str, HunkHeader> {
    (tag("@@ -"), range_spec, tag(" +"), range_spec, tag(" @@"))
        .map(|(_, old, _, new, _)| HunkHeader { old, new })
        .parse(input)
}
