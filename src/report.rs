// Tab-separated dump of laid-out snakes
use crate::layout::GroupLayout;
use std::io::{self, Write};

/// One line per block (`query level strand ref_start ref_end query_start
/// query_end`), then a `#` summary line per query and a `# query skipped`
/// line for every block rejected for its coordinates.
pub fn write_layouts<W: Write>(writer: &mut W, layouts: &[GroupLayout]) -> io::Result<()> {
    for layout in layouts {
        match layout {
            GroupLayout::Laid(result) => {
                for b in &result.blocks {
                    writeln!(
                        writer,
                        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                        result.query, b.level, b.strand, b.ref_start, b.ref_end, b.query_start, b.query_end
                    )?;
                }
                writeln!(
                    writer,
                    "# {}\tlevels={}\tblocks={}",
                    result.query,
                    result.level_count(),
                    result.blocks.len()
                )?;
                for err in &result.rejected {
                    writeln!(writer, "# {}\tskipped\t{err}", result.query)?;
                }
            }
            GroupLayout::Placeholder { query, message } => {
                writeln!(writer, "# {query}\t{message}")?;
            }
        }
    }
    Ok(())
}
