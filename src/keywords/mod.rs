use std::{path::Path, sync::LazyLock};

use anyhow::Context;
use fxhash::{FxHashMap, FxHashSet};
use regex::Regex;

pub(crate) const DEFAULT_KEYWORD_COUNT: usize = 5;
pub(crate) const DEFAULT_SKILL_COUNT: usize = 5;
const MIN_KEYWORD_LEN: usize = 3;
const ENGLISH_STOPWORDS: &str = include_str!("english_stopwords.txt");

/// Technology terms recognized in job listings, in reporting order.
///
/// Terms are matched against cleaned text, so the ones containing punctuation
/// (`c++`, `node.js`) never match.
pub(crate) const TECH_SKILLS: [&str; 38] = [
    "python", "java", "c++", "javascript", "sql", "aws", "azure", "docker", "kubernetes",
    "linux", "git", "react", "angular", "node.js", "machine learning", "data analysis",
    "devops", "agile", "scrum", "microservices", "rest api", "html", "css", "cloud",
    "spring", "hibernate", "nosql", "mongodb", "tensorflow", "pytorch", "big data",
    "spark", "hadoop", "salesforce", "sap", "oracle", "jira", "jenkins",
];

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());


/// Lowercases `text` and replaces every char that is not an ASCII letter,
/// digit or whitespace with a single space.
pub(crate) fn clean_text(text: &str) -> String {
    NON_ALPHANUMERIC.replace_all(&text.to_lowercase(), " ").into_owned()
}


/// Common words that never count as keywords.
#[derive(Debug, Clone)]
pub(crate) struct StopwordSet(FxHashSet<String>);


impl StopwordSet {
    /// The English list bundled with the binary.
    pub(crate) fn english() -> Self {
        Self::parse(ENGLISH_STOPWORDS)
    }

    /// Reads a newline separated word list.
    pub(crate) fn from_file(path: &Path) -> anyhow::Result<Self> {
        let words = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stopwords from {}", path.display()))?;
        Ok(Self::parse(&words))
    }

    fn parse(words: &str) -> Self {
        Self(
            words
                .lines()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_lowercase)
                .collect()
        )
    }

    pub(crate) fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}


/// Derives the keyword and tech skill tags attached to every job listing.
#[derive(Debug, Clone)]
pub(crate) struct TagExtractor {
    stopwords: StopwordSet,
    vocabulary: &'static [&'static str],
}


impl TagExtractor {
    pub(crate) fn new(stopwords: StopwordSet) -> Self {
        Self { stopwords, vocabulary: &TECH_SKILLS }
    }

    /// Returns up to `k` of the most frequent tokens that are not stopwords and
    /// are at least three chars long.
    ///
    /// Tokens with equal counts keep the order in which they first appeared.
    pub(crate) fn keywords(&self, text: &str, k: usize) -> Vec<String> {
        let text = clean_text(text);
        // token -> (count, first position)
        let mut counts: FxHashMap<&str, (usize, usize)> = FxHashMap::default();

        text.split_whitespace()
            .filter(|w| w.len() >= MIN_KEYWORD_LEN && !self.stopwords.contains(w))
            .enumerate()
            .for_each(|(i, w)| counts.entry(w).or_insert((0, i)).0 += 1);

        let mut ranked: Vec<_> = counts.into_iter().collect();
        ranked.sort_unstable_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_b.cmp(count_a).then(first_a.cmp(first_b))
        });
        ranked
            .into_iter()
            .take(k)
            .map(|(w, _)| w.to_string())
            .collect()
    }

    /// Returns up to `n` vocabulary terms found anywhere in the cleaned text,
    /// in vocabulary order.
    pub(crate) fn tech_skills(&self, text: &str, n: usize) -> Vec<String> {
        let text = clean_text(text);
        self.vocabulary
            .iter()
            .filter(|skill| text.contains(*skill))
            .take(n)
            .map(|skill| skill.to_string())
            .collect()
    }
}
