// Selection of the query sequences whose snakes are laid out
use std::collections::BTreeSet;

/// Selects query sequences by name (exact or prefix) or by position in the
/// name-sorted list of queries. An empty filter selects everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub names: Vec<String>,
    /// Inclusive index range over the sorted query names
    pub range: Option<(usize, usize)>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma-separated names or prefixes, e.g. `"chr1,scaffold_"`
    pub fn from_names(list: &str) -> Self {
        let names = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self { names, range: None }
    }

    /// Index range written as `"first-last"`
    pub fn from_range(text: &str) -> anyhow::Result<Self> {
        Ok(Self {
            names: Vec::new(),
            range: Some(parse_range(text)?),
        })
    }

    pub fn with_range(mut self, text: &str) -> anyhow::Result<Self> {
        self.range = Some(parse_range(text)?);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.range.is_none()
    }

    /// True if the query at `index` named `name` passes either criterion
    pub fn matches(&self, index: usize, name: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        let in_range = self
            .range
            .is_some_and(|(first, last)| (first..=last).contains(&index));
        in_range || self.names.iter().any(|n| name.starts_with(n.as_str()))
    }

    /// Names that pass the filter, indexed in sorted order
    pub fn select<'a>(&self, names: &BTreeSet<&'a str>) -> BTreeSet<&'a str> {
        names
            .iter()
            .enumerate()
            .filter(|(idx, name)| self.matches(*idx, name))
            .map(|(_, name)| *name)
            .collect()
    }
}

fn parse_range(text: &str) -> anyhow::Result<(usize, usize)> {
    let Some((first, last)) = text.split_once('-') else {
        anyhow::bail!("Range must be in format 'first-last', got: {text}");
    };
    let first: usize = first.trim().parse()?;
    let last: usize = last.trim().parse()?;
    if first > last {
        anyhow::bail!("Range start must be <= end, got: {text}");
    }
    Ok((first, last))
}
