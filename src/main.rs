use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use snakeview::layout::{DEFAULT_MARGIN, DEFAULT_MAX_LEVELS, DEFAULT_MIN_PIXELS};
use snakeview::report::write_layouts;
use snakeview::segment_reader::SegmentReader;
use snakeview::{
    display_order, group_segments, layout_all, GroupOptions, LayoutConfig, LayoutMode, QueryFilter, Viewport,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Lay out alignment blocks as snakes, one row per query sequence
#[derive(Parser, Debug)]
#[command(name = "snakeview", version, about)]
struct Args {
    /// Tab-separated alignment segments
    input: PathBuf,

    /// First reference base of the window
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// End of the window (exclusive)
    #[arg(long)]
    end: u64,

    /// Window width in pixels
    #[arg(long, default_value_t = 1000)]
    width: usize,

    #[arg(long, value_enum, default_value_t = Mode::Full)]
    mode: Mode,

    /// Drop level runs narrower than this many pixels
    #[arg(long, default_value_t = DEFAULT_MIN_PIXELS)]
    min_pixels: f64,

    /// Clearance in pixels around blocks moved by compaction
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    margin: usize,

    /// Give up on a query that needs more levels than this
    #[arg(long, default_value_t = DEFAULT_MAX_LEVELS)]
    max_levels: usize,

    /// Skip chains scoring at or below this
    #[arg(long)]
    min_score: Option<f64>,

    /// Comma-separated query names or prefixes
    #[arg(long)]
    queries: Option<String>,

    /// Query index range over sorted names, e.g. "0-5"
    #[arg(long)]
    query_range: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Full,
    Pack,
}

impl From<Mode> for LayoutMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Full => LayoutMode::Full,
            Mode::Pack => LayoutMode::Pack,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let args = Args::parse();
    if args.end <= args.start {
        anyhow::bail!("Window end must be greater than start ({}-{})", args.start, args.end);
    }

    let mut queries = match &args.queries {
        Some(names) => QueryFilter::from_names(names),
        None => QueryFilter::new(),
    };
    if let Some(range) = &args.query_range {
        queries = queries.with_range(range)?;
    }
    let options = GroupOptions {
        min_score: args.min_score,
        queries,
    };

    let config = LayoutConfig::new(Viewport::new(args.start, args.end, args.width))
        .with_mode(args.mode.into())
        .with_min_pixels(args.min_pixels)
        .with_margin(args.margin)
        .with_max_levels(args.max_levels);

    let segments = SegmentReader::open(&args.input)?.read_all_records()?;
    log::info!("read {} segments from {}", segments.len(), args.input.display());

    let mut groups = group_segments(&segments, &options);
    let mut layouts = layout_all(&mut groups, &config);
    display_order(&mut layouts);

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    write_layouts(&mut writer, &layouts)?;
    writer.flush()?;

    Ok(())
}
