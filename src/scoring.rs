//! Category buckets and score aggregation.
//!
//! Each exam has up to 100 questions named `Q1`..`Q100`. Questions are
//! grouped into four fixed buckets; the overall score is the sum of the
//! buckets. The ranges are constants of the exam layout, not configuration.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Highest question number an export can carry.
pub const MAX_QUESTION: u8 = 100;

static APTITUDE_RANGES: [RangeInclusive<u8>; 1] = [1..=20];
static AI_ML_DS_RANGES: [RangeInclusive<u8>; 2] = [21..=40, 61..=70];
static FSD_DB_RANGES: [RangeInclusive<u8>; 2] = [41..=60, 71..=80];
static DEVOPS_RANGES: [RangeInclusive<u8>; 1] = [81..=100];

/// A derived score a ranking can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Overall,
    Aptitude,
    AiMlDs,
    FsdDb,
    DevOpsTesting,
}

impl Category {
    /// All categories, in the order the selector lists them.
    pub const ALL: [Category; 5] = [
        Category::Overall,
        Category::Aptitude,
        Category::AiMlDs,
        Category::FsdDb,
        Category::DevOpsTesting,
    ];

    /// The four question buckets, in derived-column order.
    pub const BUCKETS: [Category; 4] = [
        Category::Aptitude,
        Category::AiMlDs,
        Category::FsdDb,
        Category::DevOpsTesting,
    ];

    /// Column header / selector label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Overall => "Overall (100)",
            Category::Aptitude => "Aptitude (20) [Q1–Q20]",
            Category::AiMlDs => "AI/ML/DS (30) [Q21–Q40 + Q61–Q70]",
            Category::FsdDb => "FSD/DB (30) [Q41–Q60 + Q71–Q80]",
            Category::DevOpsTesting => "DevOps/Testing (20) [Q81–Q100]",
        }
    }

    /// Short key used on the command line and in the config file.
    pub fn key(self) -> &'static str {
        match self {
            Category::Overall => "overall",
            Category::Aptitude => "aptitude",
            Category::AiMlDs => "ai-ml-ds",
            Category::FsdDb => "fsd-db",
            Category::DevOpsTesting => "devops",
        }
    }

    /// Question ranges summed into this bucket. `Overall` has none of its
    /// own: it is always the sum of the four buckets.
    pub fn question_ranges(self) -> &'static [RangeInclusive<u8>] {
        match self {
            Category::Overall => &[],
            Category::Aptitude => &APTITUDE_RANGES,
            Category::AiMlDs => &AI_ML_DS_RANGES,
            Category::FsdDb => &FSD_DB_RANGES,
            Category::DevOpsTesting => &DEVOPS_RANGES,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the short key or the full label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let keys: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
                format!("Unknown category '{}' (expected one of: {})", s, keys.join(", "))
            })
    }
}

/// Question number for a `Q<n>` header, if it is one.
pub fn question_index(header: &str) -> Option<u8> {
    lazy_static::lazy_static! {
        static ref QUESTION_HEADER: Regex = Regex::new(r"^Q([1-9][0-9]?|100)$").unwrap();
    }

    QUESTION_HEADER
        .captures(header)
        .and_then(|caps| caps[1].parse().ok())
}

/// Sparse per-question scores of one student. Absent questions count 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers(BTreeMap<u8, f64>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: u8, value: f64) {
        self.0.insert(question, value);
    }

    /// Score for a question, 0 when absent.
    pub fn get(&self, question: u8) -> f64 {
        self.0.get(&question).copied().unwrap_or(0.0)
    }

    pub fn sum_range(&self, range: RangeInclusive<u8>) -> f64 {
        self.0.range(range).map(|(_, v)| v).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.0.iter().map(|(q, v)| (*q, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u8, f64)> for Answers {
    fn from_iter<I: IntoIterator<Item = (u8, f64)>>(iter: I) -> Self {
        Answers(iter.into_iter().collect())
    }
}

/// The four bucket scores of a student. The overall score is derived on
/// read, so it can never disagree with the buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scores {
    aptitude: f64,
    ai_ml_ds: f64,
    fsd_db: f64,
    devops: f64,
}

impl Scores {
    pub fn aptitude(&self) -> f64 {
        self.aptitude
    }

    pub fn ai_ml_ds(&self) -> f64 {
        self.ai_ml_ds
    }

    pub fn fsd_db(&self) -> f64 {
        self.fsd_db
    }

    pub fn devops(&self) -> f64 {
        self.devops
    }

    pub fn overall(&self) -> f64 {
        self.aptitude + self.ai_ml_ds + self.fsd_db + self.devops
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Overall => self.overall(),
            Category::Aptitude => self.aptitude,
            Category::AiMlDs => self.ai_ml_ds,
            Category::FsdDb => self.fsd_db,
            Category::DevOpsTesting => self.devops,
        }
    }
}

fn bucket_sum(answers: &Answers, category: Category) -> f64 {
    category
        .question_ranges()
        .iter()
        .map(|r| answers.sum_range(r.clone()))
        .sum()
}

/// Sum a student's answers into the four buckets.
pub fn compute_scores(answers: &Answers) -> Scores {
    Scores {
        aptitude: bucket_sum(answers, Category::Aptitude),
        ai_ml_ds: bucket_sum(answers, Category::AiMlDs),
        fsd_db: bucket_sum(answers, Category::FsdDb),
        devops: bucket_sum(answers, Category::DevOpsTesting),
    }
}
