// Reader for tab-separated alignment segments, one block per line:
//
//   query  query_len  chain_id  strand  score  ref_start  ref_end  query_start  query_end
//
// Blank lines and lines starting with '#' are skipped.
use crate::block::Segment;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const COLUMNS: usize = 9;

pub struct SegmentReader<R> {
    reader: R,
    line: String,
    line_no: usize,
}

impl SegmentReader<BufReader<File>> {
    /// Open a segment file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open segment file: {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> SegmentReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
        }
    }

    /// Read the next segment, `None` at end of input
    pub fn read_record(&mut self) -> Result<Option<Segment>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let text = self.line.trim_end();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let seg = parse_line(text).with_context(|| format!("line {}: {}", self.line_no, text))?;
            return Ok(Some(seg));
        }
    }

    /// Read all remaining segments into a vector
    pub fn read_all_records(&mut self) -> Result<Vec<Segment>> {
        let mut records = Vec::new();
        while let Some(rec) = self.read_record()? {
            records.push(rec);
        }
        Ok(records)
    }
}

fn parse_line(text: &str) -> Result<Segment> {
    let fields: Vec<&str> = text.split('\t').collect();
    if fields.len() != COLUMNS {
        anyhow::bail!("expected {COLUMNS} tab-separated columns, found {}", fields.len());
    }
    Ok(Segment {
        query: fields[0].to_string(),
        query_len: fields[1].parse().context("query_len")?,
        chain_id: fields[2].parse().context("chain_id")?,
        strand: fields[3].parse()?,
        score: fields[4].parse().context("score")?,
        ref_start: fields[5].parse().context("ref_start")?,
        ref_end: fields[6].parse().context("ref_end")?,
        query_start: fields[7].parse().context("query_start")?,
        query_end: fields[8].parse().context("query_end")?,
    })
}
