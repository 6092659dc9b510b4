//! Sorted, truncated views over a result set.

use crate::results::{ResultSet, StudentRecord};
use crate::scoring::Category;
use std::fmt;
use std::str::FromStr;

/// How many top-ranked records a view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopN {
    Count(usize),
    All,
}

impl TopN {
    /// Choices offered by the top-N selector.
    pub const CHOICES: [TopN; 7] = [
        TopN::Count(5),
        TopN::Count(10),
        TopN::Count(20),
        TopN::Count(30),
        TopN::Count(40),
        TopN::Count(50),
        TopN::All,
    ];

    /// Number of records kept out of `total`.
    pub fn limit(self, total: usize) -> usize {
        match self {
            TopN::Count(n) => n.min(total),
            TopN::All => total,
        }
    }
}

impl Default for TopN {
    fn default() -> Self {
        TopN::Count(10)
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopN::Count(n) => write!(f, "{}", n),
            TopN::All => f.write_str("All"),
        }
    }
}

impl FromStr for TopN {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(TopN::All);
        }
        s.parse::<usize>()
            .map(TopN::Count)
            .map_err(|_| format!("Invalid top-N '{}' (expected a number or 'all')", s))
    }
}

/// A record at its position in a view.
#[derive(Debug, Clone, Copy)]
pub struct RankedEntry<'a> {
    /// 1-based rank
    pub rank: usize,
    pub record: &'a StudentRecord,
}

impl RankedEntry<'_> {
    pub fn score(&self, category: Category) -> f64 {
        self.record.score(category)
    }
}

/// Records ordered by one category, highest first, cut to a top-N.
#[derive(Debug, Clone)]
pub struct RankedView<'a> {
    category: Category,
    top_n: TopN,
    entries: Vec<RankedEntry<'a>>,
}

impl<'a> RankedView<'a> {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn top_n(&self) -> TopN {
        self.top_n
    }

    pub fn entries(&self) -> &[RankedEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a 1-based rank.
    pub fn get(&self, rank: usize) -> Option<&RankedEntry<'a>> {
        rank.checked_sub(1).and_then(|idx| self.entries.get(idx))
    }

    /// Selected-category score of each entry, in rank order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(move |e| e.score(self.category))
    }
}

/// Order records by `category` descending and keep the first `top_n`.
///
/// The sort is stable: records with equal scores keep their merged order.
pub fn rank_results(results: &ResultSet, category: Category, top_n: TopN) -> RankedView<'_> {
    let mut ordered: Vec<&StudentRecord> = results.records().iter().collect();
    ordered.sort_by(|a, b| b.score(category).total_cmp(&a.score(category)));
    ordered.truncate(top_n.limit(ordered.len()));

    let entries = ordered
        .into_iter()
        .enumerate()
        .map(|(idx, record)| RankedEntry {
            rank: idx + 1,
            record,
        })
        .collect();

    RankedView {
        category,
        top_n,
        entries,
    }
}
