// Grouping of alignment segments into one snake per query sequence
use crate::block::{AlignmentBlock, Segment};
use crate::error::LayoutError;
use crate::layout::{layout_group, LayoutConfig, LayoutResult};
use crate::query_filter::QueryFilter;
use std::collections::{BTreeMap, BTreeSet};

/// Which chains and query sequences take part in the layout
#[derive(Clone, Debug, Default)]
pub struct GroupOptions {
    /// Chains scoring at or below this are skipped
    pub min_score: Option<f64>,
    pub queries: QueryFilter,
}

/// All blocks aligned to one query sequence, in the order the chains
/// delivered them. Holds the last layout computed for it.
#[derive(Debug, Clone)]
pub struct Group {
    query: String,
    query_len: u64,
    blocks: Vec<AlignmentBlock>,
    cached: Option<(LayoutConfig, LayoutResult)>,
}

impl Group {
    pub fn new(query: &str, query_len: u64) -> Self {
        Self {
            query: query.to_string(),
            query_len,
            blocks: Vec::new(),
            cached: None,
        }
    }

    pub fn with_blocks(query: &str, query_len: u64, blocks: Vec<AlignmentBlock>) -> Self {
        Self {
            blocks,
            ..Self::new(query, query_len)
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_len(&self) -> u64 {
        self.query_len
    }

    pub fn blocks(&self) -> &[AlignmentBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn push(&mut self, block: AlignmentBlock) {
        self.cached = None;
        self.blocks.push(block);
    }

    pub fn set_blocks(&mut self, blocks: Vec<AlignmentBlock>) {
        self.cached = None;
        self.blocks = blocks;
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Layout for `config`, computed on first use and reused until the
    /// blocks or the configuration change.
    pub fn layout(&mut self, config: &LayoutConfig) -> Result<&LayoutResult, LayoutError> {
        if self.cached.as_ref().is_some_and(|(used, _)| used != config) {
            self.cached = None;
        }
        let result = match self.cached.take() {
            Some((_, result)) => result,
            None => layout_group(self, config)?,
        };
        Ok(&self.cached.insert((config.clone(), result)).1)
    }
}

/// Partition segments by query sequence. Groups come back sorted by query
/// name; within a group the input order is kept.
pub fn group_segments(segments: &[Segment], options: &GroupOptions) -> Vec<Group> {
    let names: BTreeSet<&str> = segments.iter().map(|s| s.query.as_str()).collect();
    let selected = options.queries.select(&names);

    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    let mut skipped = 0usize;
    for seg in segments {
        if !selected.contains(seg.query.as_str()) {
            continue;
        }
        if options.min_score.is_some_and(|min| seg.score <= min) {
            skipped += 1;
            continue;
        }
        let group = groups
            .entry(seg.query.as_str())
            .or_insert_with(|| Group::new(&seg.query, seg.query_len));
        group.query_len = group.query_len.max(seg.query_len);
        group.blocks.push(AlignmentBlock::from(seg));
    }

    log::debug!(
        "grouped {} segments into {} queries ({} below score cutoff)",
        segments.len(),
        groups.len(),
        skipped
    );
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Strand;
    use crate::viewport::Viewport;

    fn seg(query: &str, chain_id: u64, score: f64, strand: Strand, r: (u64, u64), q: (u64, u64)) -> Segment {
        Segment {
            query: query.to_string(),
            query_len: 10_000,
            chain_id,
            strand,
            score,
            ref_start: r.0,
            ref_end: r.1,
            query_start: q.0,
            query_end: q.1,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(group_segments(&[], &GroupOptions::default()).is_empty());
    }

    #[test]
    fn test_groups_by_query_and_keeps_order() {
        let segments = vec![
            seg("chrB", 1, 100.0, Strand::Forward, (500, 600), (0, 100)),
            seg("chrA", 2, 50.0, Strand::Reverse, (300, 400), (900, 1000)),
            seg("chrB", 1, 100.0, Strand::Forward, (100, 200), (200, 300)),
            seg("chrA", 2, 50.0, Strand::Reverse, (100, 200), (1000, 1100)),
        ];
        let groups = group_segments(&segments, &GroupOptions::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].query(), "chrA");
        assert_eq!(groups[1].query(), "chrB");

        let a: Vec<_> = groups[0].blocks().iter().map(|b| b.ref_start).collect();
        assert_eq!(a, vec![300, 100]);
        assert!(groups[0].blocks().iter().all(|b| b.strand == Strand::Reverse && b.score == 50.0));

        let b: Vec<_> = groups[1].blocks().iter().map(|b| b.ref_start).collect();
        assert_eq!(b, vec![500, 100]);
        assert_eq!(groups[1].blocks()[0].chain_id, 1);
    }

    #[test]
    fn test_score_and_query_filters() {
        let segments = vec![
            seg("chr1", 1, 1000.0, Strand::Forward, (0, 100), (0, 100)),
            seg("chr1", 2, 10.0, Strand::Forward, (200, 300), (200, 300)),
            seg("chr2", 3, 1000.0, Strand::Forward, (0, 100), (0, 100)),
            seg("scaf9", 4, 1000.0, Strand::Forward, (0, 100), (0, 100)),
        ];
        let options = GroupOptions {
            min_score: Some(10.0),
            queries: QueryFilter::from_names("chr"),
        };
        let groups = group_segments(&segments, &options);
        let names: Vec<_> = groups.iter().map(|g| g.query()).collect();
        assert_eq!(names, vec!["chr1", "chr2"]);
        assert_eq!(groups[0].len(), 1);
    }

    #[test]
    fn test_layout_is_cached_until_blocks_change() {
        let mut group = Group::with_blocks(
            "chr1",
            1000,
            vec![
                AlignmentBlock::new(100, 200, 0, 100, Strand::Forward),
                AlignmentBlock::new(300, 400, 100, 200, Strand::Forward),
            ],
        );
        let config = LayoutConfig::new(Viewport::new(0, 1000, 1000));

        assert!(!group.is_cached());
        let levels = group.layout(&config).unwrap().level_count();
        assert_eq!(levels, 1);
        assert!(group.is_cached());

        // a second request with the same configuration is served from cache
        assert_eq!(group.layout(&config).unwrap().blocks.len(), 2);
        assert!(group.is_cached());

        group.push(AlignmentBlock::new(150, 250, 500, 600, Strand::Reverse));
        assert!(!group.is_cached());
        assert_eq!(group.layout(&config).unwrap().level_count(), 2);

        let wider = LayoutConfig::new(Viewport::new(0, 2000, 1000));
        assert_eq!(group.layout(&wider).unwrap().blocks.len(), 3);
    }
}
