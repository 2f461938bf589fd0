// Alignment blocks: the unit the snake layout places on levels
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Orientation of the query relative to the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Strand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => anyhow::bail!("Strand must be '+' or '-', got: {other}"),
        }
    }
}

/// One ungapped segment as delivered by the storage layer, still carrying
/// the attributes of the chain it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub query: String,
    pub query_len: u64,
    pub chain_id: u64,
    pub strand: Strand,
    pub score: f64,
    pub ref_start: u64,
    pub ref_end: u64,
    pub query_start: u64,
    pub query_end: u64,
}

/// A segment tagged for layout. `level` is meaningful only after the level
/// assigner has run.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentBlock {
    pub ref_start: u64,
    pub ref_end: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub strand: Strand,
    pub chain_id: u64,
    pub score: f64,
    pub level: usize,
}

impl AlignmentBlock {
    pub fn new(ref_start: u64, ref_end: u64, query_start: u64, query_end: u64, strand: Strand) -> Self {
        Self {
            ref_start,
            ref_end,
            query_start,
            query_end,
            strand,
            chain_id: 0,
            score: 0.0,
            level: 0,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn ref_len(&self) -> u64 {
        self.ref_end.saturating_sub(self.ref_start)
    }

    pub fn query_len(&self) -> u64 {
        self.query_end.saturating_sub(self.query_start)
    }

    /// Half-open intersection with a reference window
    pub fn intersects(&self, start: u64, end: u64) -> bool {
        self.ref_start < end && start < self.ref_end
    }
}

impl From<&Segment> for AlignmentBlock {
    fn from(seg: &Segment) -> Self {
        Self {
            ref_start: seg.ref_start,
            ref_end: seg.ref_end,
            query_start: seg.query_start,
            query_end: seg.query_end,
            strand: seg.strand,
            chain_id: seg.chain_id,
            score: seg.score,
            level: 0,
        }
    }
}

/// Order in which blocks are handed to the level assigner and back to the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Reference start, ties broken by query start
    Reference,
    /// Query start, ties broken by reference start
    Query,
}

impl SortOrder {
    pub fn compare(self, a: &AlignmentBlock, b: &AlignmentBlock) -> Ordering {
        match self {
            SortOrder::Reference => a
                .ref_start
                .cmp(&b.ref_start)
                .then(a.query_start.cmp(&b.query_start)),
            SortOrder::Query => a
                .query_start
                .cmp(&b.query_start)
                .then(a.ref_start.cmp(&b.ref_start)),
        }
    }

    /// Stable sort, so equal keys keep their chain order
    pub fn sort(self, blocks: &mut [AlignmentBlock]) {
        blocks.sort_by(|a, b| self.compare(a, b));
    }
}

/// Highest score first. NaN scores sort last.
pub(crate) fn by_score_desc(a: &AlignmentBlock, b: &AlignmentBlock) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or_else(|| a.score.is_nan().cmp(&b.score.is_nan()))
}
