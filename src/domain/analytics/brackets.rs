use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::monthly::{MonthFill, MonthKey, fill_gaps};
use crate::domain::errors::AggregationError;
use crate::domain::videos::ClassifiedRecord;

/// Lower bounds of the default view brackets. The last bracket is open-ended.
pub const DEFAULT_BRACKET_BOUNDARIES: [i64; 10] = [
    0, 1_000, 5_000, 10_000, 25_000, 50_000, 100_000, 250_000, 500_000, 1_000_000,
];

/// Validated, strictly ascending lower bounds that partition `[0, ∞)`.
///
/// A leading zero is implied: boundaries starting above zero gain a
/// `[0, first)` bracket so every view count has a home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketBoundaries(Vec<u64>);

impl BracketBoundaries {
    pub fn new(boundaries: &[i64]) -> Result<Self, AggregationError> {
        if let Some(negative) = boundaries.iter().find(|&&b| b < 0) {
            return Err(AggregationError::InvalidBracketBoundaries(format!(
                "{negative} is negative"
            )));
        }
        if let Some(pair) = boundaries.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(AggregationError::InvalidBracketBoundaries(format!(
                "{} is not greater than {}",
                pair[1], pair[0]
            )));
        }

        let mut lowers: Vec<u64> = boundaries.iter().map(|&b| b as u64).collect();
        if lowers.first() != Some(&0) {
            lowers.insert(0, 0);
        }
        Ok(Self(lowers))
    }

    /// Parse and validate a comma separated list such as `0, 1000, 10000`.
    pub fn parse(text: &str) -> Result<Self, AggregationError> {
        Self::new(&parse_boundary_list(text)?)
    }

    pub fn lowers(&self) -> &[u64] {
        &self.0
    }

    /// Index of the bracket containing `views`.
    pub fn index_of(&self, views: u64) -> usize {
        // lowers[0] == 0, so the partition point is always at least 1
        self.0.partition_point(|&lower| lower <= views) - 1
    }

    pub fn ranges(&self) -> impl Iterator<Item = (u64, Option<u64>)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(i, &lower)| (lower, self.0.get(i + 1).copied()))
    }
}

/// Split a comma separated list of integers. `_` digit separators are allowed.
pub fn parse_boundary_list(text: &str) -> Result<Vec<i64>, AggregationError> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.replace('_', "").parse::<i64>().map_err(|_| {
                AggregationError::InvalidBracketBoundaries(format!("{s:?} is not a number"))
            })
        })
        .collect()
}

impl Default for BracketBoundaries {
    fn default() -> Self {
        Self(DEFAULT_BRACKET_BOUNDARIES.iter().map(|&b| b as u64).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewBracket {
    pub label: String,
    /// Inclusive.
    pub lower: u64,
    /// Exclusive; `None` for the final open-ended bracket.
    pub upper: Option<u64>,
    pub videos: u64,
}

impl ViewBracket {
    pub fn contains(&self, views: u64) -> bool {
        views >= self.lower && self.upper.is_none_or(|upper| views < upper)
    }
}

/// `0-999`, `1000-9999`, `1000000+`.
pub fn bracket_label(lower: u64, upper: Option<u64>) -> String {
    match upper {
        Some(upper) => format!("{lower}-{}", upper - 1),
        None => format!("{lower}+"),
    }
}

/// Count records per view bracket, ascending by range. Every bracket is
/// listed once there is at least one record; empty input yields no rows.
pub fn view_brackets(
    records: &[ClassifiedRecord],
    boundaries: &BracketBoundaries,
) -> Vec<ViewBracket> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut counts = vec![0u64; boundaries.lowers().len()];
    for record in records {
        counts[boundaries.index_of(record.video.view_count)] += 1;
    }

    boundaries
        .ranges()
        .zip(counts)
        .map(|((lower, upper), videos)| ViewBracket {
            label: bracket_label(lower, upper),
            lower,
            upper,
            videos,
        })
        .collect()
}

/// One month of the bracket split. `counts` follows bracket order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBrackets {
    pub month: MonthKey,
    pub counts: Vec<u64>,
}

impl MonthBrackets {
    pub fn videos(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Count records per view bracket within each publish month, oldest month
/// first. Months are chosen by the same `fill` rule as the monthly summary.
pub fn monthly_view_brackets(
    records: &[ClassifiedRecord],
    boundaries: &BracketBoundaries,
    fill: MonthFill,
) -> Vec<MonthBrackets> {
    let width = boundaries.lowers().len();
    let mut months: BTreeMap<MonthKey, Vec<u64>> = BTreeMap::new();

    for record in records {
        let counts = months
            .entry(MonthKey::of(record.video.published_date()))
            .or_insert_with(|| vec![0; width]);
        counts[boundaries.index_of(record.video.view_count)] += 1;
    }

    if fill == MonthFill::Dense {
        fill_gaps(&mut months, |_| vec![0; width]);
    }

    months
        .into_iter()
        .map(|(month, counts)| MonthBrackets { month, counts })
        .collect()
}
