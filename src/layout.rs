// The snake layout pipeline for one or many query sequences
use crate::assign::{assign_levels, keep_visible_levels, verify_levels, LayoutMode};
use crate::block::AlignmentBlock;
use crate::compact::{compact_levels, renumber_dense};
use crate::coverage::single_coverage;
use crate::error::LayoutError;
use crate::group::Group;
use crate::viewport::Viewport;

/// Runs narrower than this many pixels are not drawn
pub const DEFAULT_MIN_PIXELS: f64 = 1.0;
/// Clearance kept around blocks pushed down by compaction
pub const DEFAULT_MARGIN: usize = 10;
pub const DEFAULT_MAX_LEVELS: usize = 1000;

/// Shown in place of a snake that could not be laid out
pub const PLACEHOLDER_MESSAGE: &str = "too many items, narrow the view";

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub viewport: Viewport,
    pub mode: LayoutMode,
    pub min_pixels: f64,
    /// Pixels of clearance required on each side when compacting
    pub margin: usize,
    pub max_levels: usize,
}

impl LayoutConfig {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            mode: LayoutMode::default(),
            min_pixels: DEFAULT_MIN_PIXELS,
            margin: DEFAULT_MARGIN,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }

    pub fn with_mode(mut self, mode: LayoutMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_min_pixels(mut self, min_pixels: f64) -> Self {
        self.min_pixels = min_pixels;
        self
    }

    pub fn with_margin(mut self, margin: usize) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }
}

/// The laid-out snake of one query sequence
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub query: String,
    pub mode: LayoutMode,
    /// Blocks with their final level, in the mode's sort order
    pub blocks: Vec<AlignmentBlock>,
    /// `None` when nothing survived
    pub max_level: Option<usize>,
    /// Blocks skipped for bad coordinates, one error each
    pub rejected: Vec<LayoutError>,
}

impl LayoutResult {
    pub fn level_count(&self) -> usize {
        self.max_level.map_or(0, |top| top + 1)
    }

    /// Row height in pixels. Full snakes use two lines per level to leave
    /// room for the transition lines.
    pub fn height(&self, line_height: usize) -> usize {
        let multiplier = match self.mode {
            LayoutMode::Full => 2,
            LayoutMode::Pack => 1,
        };
        self.level_count() * multiplier * line_height
    }

    /// Reference bases covered by the displayed blocks
    pub fn aligned_bases(&self) -> u64 {
        self.blocks.iter().map(|b| b.ref_len()).sum()
    }

    pub fn on_level(&self, level: usize) -> impl Iterator<Item = &AlignmentBlock> {
        self.blocks.iter().filter(move |b| b.level == level)
    }

    /// Consecutive blocks that sit on different levels; the renderer joins
    /// each pair with a transition line.
    pub fn transitions(&self) -> impl Iterator<Item = (&AlignmentBlock, &AlignmentBlock)> {
        self.blocks
            .windows(2)
            .filter(|pair| pair[0].level != pair[1].level)
            .map(|pair| (&pair[0], &pair[1]))
    }
}

/// Outcome for one query sequence in a multi-group layout
#[derive(Debug, Clone, PartialEq)]
pub enum GroupLayout {
    Laid(LayoutResult),
    /// The group failed; the row shows `message` instead of a snake
    Placeholder { query: String, message: String },
}

impl GroupLayout {
    pub fn query(&self) -> &str {
        match self {
            GroupLayout::Laid(result) => &result.query,
            GroupLayout::Placeholder { query, .. } => query,
        }
    }

    fn aligned_bases(&self) -> u64 {
        match self {
            GroupLayout::Laid(result) => result.aligned_bases(),
            GroupLayout::Placeholder { .. } => 0,
        }
    }
}

/// Lay out one group: single coverage, level assignment and, for full
/// snakes, the visibility pass and compaction.
pub fn layout_group(group: &Group, config: &LayoutConfig) -> Result<LayoutResult, LayoutError> {
    let query = group.query();
    let order = config.mode.sort_order();
    let coverage = single_coverage(query, group.query_len(), group.blocks(), order);
    let rejected = coverage.rejected;
    let assigned = assign_levels(query, coverage.kept, config)?;

    let mut blocks = match config.mode {
        LayoutMode::Full => {
            verify_levels(query, &assigned.blocks)?;
            let visible = keep_visible_levels(assigned.blocks, &config.viewport);
            compact_levels(visible, &config.viewport, config.margin, order)
        }
        LayoutMode::Pack => assigned.blocks,
    };
    let max_level = renumber_dense(&mut blocks);

    Ok(LayoutResult {
        query: query.to_string(),
        mode: config.mode,
        blocks,
        max_level,
        rejected,
    })
}

/// Lay out every group. A group that fails is replaced by a placeholder;
/// the others are unaffected. Results are cached on the groups.
pub fn layout_all(groups: &mut [Group], config: &LayoutConfig) -> Vec<GroupLayout> {
    groups
        .iter_mut()
        .map(|group| match group.layout(config) {
            Ok(result) => GroupLayout::Laid(result.clone()),
            Err(err) => {
                log::warn!("{}: layout failed: {err}", group.query());
                let message = match err {
                    LayoutError::TooManyLevels { .. } => PLACEHOLDER_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                GroupLayout::Placeholder {
                    query: group.query().to_string(),
                    message,
                }
            }
        })
        .collect()
}

/// Order rows for drawing: most aligned bases first, placeholders last
pub fn display_order(layouts: &mut [GroupLayout]) {
    layouts.sort_by_key(|layout| std::cmp::Reverse(layout.aligned_bases()));
}
