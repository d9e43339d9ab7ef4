use std::{collections::HashMap, fmt};

use super::Record;

/// Distinct values with their frequencies, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueCounts(pub Vec<(String, usize)>);

impl ValueCounts {
    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, n)| n).sum()
    }

    pub fn get(&self, value: &str) -> Option<usize> {
        self.0.iter().find(|(v, _)| v == value).map(|(_, n)| *n)
    }
}

/// Count occurrences of each distinct value. Sorted by descending count;
/// equal counts keep the order in which the values were first seen.
pub fn value_counts<'a, I>(values: I) -> ValueCounts
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for v in values {
        match index.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }
    // stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    ValueCounts(counts)
}

pub fn gender_distribution(records: &[Record]) -> ValueCounts {
    value_counts(records.iter().map(|r| r.gender.as_str()))
}

impl fmt::Display for ValueCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .0
            .iter()
            .map(|(v, _)| v.chars().count())
            .max()
            .unwrap_or(0)
            .max("gender".len());
        writeln!(f, "{:<width$}", "gender", width = width)?;
        for (value, count) in &self.0 {
            writeln!(f, "{:<width$}    {}", value, count, width = width)?;
        }
        write!(f, "Name: count, dtype: int64")
    }
}
