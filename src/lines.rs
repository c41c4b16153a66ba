use std::ops::Index;

/// Ordered sequence of trimmed, whitespace-collapsed, non-empty lines.
/// Adjacency encodes layout proximity, which the date and name lookback
/// heuristics depend on, so order is never rearranged after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSequence(Vec<String>);

impl LineSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

impl Index<usize> for LineSequence {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.0[index]
    }
}

/// Pure transformation: split on line boundaries, collapse internal
/// whitespace runs to single spaces, drop lines that end up empty.
/// Relative order is preserved; empty input yields an empty sequence.
pub fn normalize(raw: &str) -> LineSequence {
    let lines = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    LineSequence(lines)
}
