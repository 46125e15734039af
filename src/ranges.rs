//! Run-length column tokens: encoding column sets to `1,3-5` lists and back
//!
//! A row's token list is a comma-separated sequence of:
//! - `N` - a single column
//! - `A-B` - every column from A to B inclusive
//! - `dK` - a copy of the K-th row already defined in the current frame

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// One run of consecutive foreground columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRun {
    Single(u32),
    Range(u32, u32),
}

impl fmt::Display for ColumnRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRun::Single(column) => write!(f, "{}", column),
            ColumnRun::Range(start, end) => write!(f, "{}-{}", start, end),
        }
    }
}

/// A token that could not be resolved. Never fatal: the token adds no columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid token '{0}'")]
    Invalid(String),
    #[error("range '{token}' runs backwards")]
    Reversed { token: String },
    #[error("invalid back-reference '{token}': only {defined} row(s) defined in this frame")]
    InvalidBackReference { token: String, defined: usize },
    #[error("column {column} is outside the canvas width {width}")]
    OutOfRange { column: u32, width: u32 },
}

/// Split a column set into maximal runs of consecutive columns, ascending.
pub fn column_runs(columns: &BTreeSet<u32>) -> Vec<ColumnRun> {
    let mut runs = Vec::new();
    let mut iter = columns.iter().copied();

    let Some(first) = iter.next() else {
        return runs;
    };

    let (mut start, mut end) = (first, first);
    for column in iter {
        if column == end + 1 {
            end = column;
            continue;
        }
        runs.push(run(start, end));
        start = column;
        end = column;
    }
    runs.push(run(start, end));

    runs
}

fn run(start: u32, end: u32) -> ColumnRun {
    if start == end {
        ColumnRun::Single(start)
    } else {
        ColumnRun::Range(start, end)
    }
}

/// Encode a column set as a token list, e.g. `{1, 3, 4, 5}` becomes `1,3-5`.
///
/// An empty set yields an empty string; callers omit such rows entirely.
pub fn encode_columns(columns: &BTreeSet<u32>) -> String {
    column_runs(columns).iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// Resolve a token list into a column set.
///
/// `defined` holds the rows already defined in the current frame, in definition
/// order; `dK` copies `defined[K - 1]`. Columns above `max_column` are dropped.
/// Every token that cannot be used is reported and otherwise ignored.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use sumimg::ranges::parse_columns;
///
/// let (columns, errors) = parse_columns("1,3-4", &[], 8);
/// assert_eq!(columns, BTreeSet::from([1, 3, 4]));
/// assert!(errors.is_empty());
///
/// let earlier = vec![BTreeSet::from([2, 5])];
/// let (columns, _) = parse_columns("d1,7", &earlier, 8);
/// assert_eq!(columns, BTreeSet::from([2, 5, 7]));
/// ```
pub fn parse_columns(
    list: &str,
    defined: &[BTreeSet<u32>],
    max_column: u32,
) -> (BTreeSet<u32>, Vec<TokenError>) {
    let mut columns = BTreeSet::new();
    let mut errors = Vec::new();

    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(reference) = token.strip_prefix('d') {
            match parse_reference(reference) {
                Some(k) if k >= 1 && k <= defined.len() => {
                    columns.extend(defined[k - 1].iter().copied());
                }
                Some(_) => errors.push(TokenError::InvalidBackReference {
                    token: token.to_string(),
                    defined: defined.len(),
                }),
                None => errors.push(TokenError::Invalid(token.to_string())),
            }
            continue;
        }

        let (start, end) = match token.split_once('-') {
            Some((a, b)) => match (parse_column(a), parse_column(b)) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    errors.push(TokenError::Invalid(token.to_string()));
                    continue;
                }
            },
            None => match parse_column(token) {
                Some(n) => (n, n),
                None => {
                    errors.push(TokenError::Invalid(token.to_string()));
                    continue;
                }
            },
        };

        if start > end {
            errors.push(TokenError::Reversed { token: token.to_string() });
            continue;
        }

        if end > max_column {
            let first_outside = start.max(max_column.saturating_add(1));
            errors.push(TokenError::OutOfRange { column: first_outside, width: max_column });
        }
        if start <= max_column {
            columns.extend(start..=end.min(max_column));
        }
    }

    (columns, errors)
}

/// The `K` of a `dK` token: plain ASCII digits only.
fn parse_reference(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Column indices are 1-based; `0` and anything non-numeric are rejected.
fn parse_column(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok().filter(|&n| n >= 1)
}
