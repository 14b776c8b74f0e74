use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::videos::ClassifiedRecord;

pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub record: ClassifiedRecord,
}

/// Most viewed first; ties go to the earlier upload, then the smaller id.
fn by_popularity(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
    b.video
        .view_count
        .cmp(&a.video.view_count)
        .then_with(|| a.video.published_at.cmp(&b.video.published_at))
        .then_with(|| a.video.id.cmp(&b.video.id))
}

/// The `top_n` most viewed records, ranked from 1.
pub fn rank_top(records: &[ClassifiedRecord], top_n: usize) -> Vec<RankedEntry> {
    let mut ordered: Vec<&ClassifiedRecord> = records.iter().collect();
    ordered.sort_by(|a, b| by_popularity(a, b));

    ordered
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, record)| RankedEntry {
            rank: i + 1,
            record: record.clone(),
        })
        .collect()
}
