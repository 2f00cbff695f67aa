//! Keyword lists and label encodings shared by extraction and scoring.

/// Role-aware technical vocabularies. Every list is scanned regardless of the
/// candidate's role.
pub(crate) const SOFTWARE_TERMS: &[&str] = &[
    "algorithm",
    "data structure",
    "api",
    "database",
    "framework",
    "debug",
    "optimize",
    "deploy",
    "scalable",
    "agile",
    "git",
    "rest",
    "graphql",
    "microservice",
    "container",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "ci/cd",
    "testing",
    "unit test",
];

pub(crate) const DATA_TERMS: &[&str] = &[
    "pandas",
    "numpy",
    "sql",
    "etl",
    "pipeline",
    "analysis",
    "visualization",
    "statistics",
    "machine learning",
    "ai",
    "model",
    "training",
    "inference",
    "tensorflow",
    "pytorch",
    "classification",
    "regression",
    "clustering",
    "neural network",
];

pub(crate) const PRODUCT_TERMS: &[&str] = &[
    "user story",
    "roadmap",
    "stakeholder",
    "requirement",
    "wireframe",
    "prototype",
    "user experience",
    "ui/ux",
    "metrics",
    "kpi",
    "a/b test",
    "customer journey",
];

pub(crate) const TECHNICAL_VOCABULARIES: &[&[&str]] = &[SOFTWARE_TERMS, DATA_TERMS, PRODUCT_TERMS];

/// Achievement and leadership language.
pub(crate) const POSITIVE_KEYWORDS: &[&str] = &[
    "achieved",
    "implemented",
    "improved",
    "optimized",
    "solved",
    "led",
    "managed",
    "created",
    "developed",
    "designed",
    "collaborated",
    "mentored",
    "trained",
    "resolved",
    "delivered",
    "successfully",
    "efficient",
    "effective",
    "scalable",
    "robust",
];

/// Hedging phrases, filler words and vague qualifiers.
pub(crate) const NEGATIVE_KEYWORDS: &[&str] = &[
    "struggled",
    "failed",
    "difficult",
    "challenge",
    "problem",
    "issue",
    "bug",
    "error",
    "slow",
    "inefficient",
    "poor",
    "limited",
    "basic",
    "simple",
    "just",
    "only",
    "maybe",
    "i think",
    "not sure",
    "um",
    "uh",
    "like",
    "basically",
];

pub(crate) const EXAMPLE_PHRASES: &[&str] = &["for example", "for instance", "such as"];

pub const DEFAULT_ROLE_INDEX: u8 = 0;
pub const DEFAULT_LEVEL_INDEX: u8 = 1;

const ROLE_TABLE: &[(&str, u8)] = &[
    ("software engineer", 0),
    ("data scientist", 1),
    ("product manager", 2),
    ("ml engineer", 3),
    ("backend engineer", 4),
    ("frontend engineer", 5),
];

const LEVEL_TABLE: &[(&str, u8)] = &[
    ("entry", 0),
    ("junior", 0),
    ("mid", 1),
    ("mid-level", 1),
    ("senior", 2),
    ("lead", 3),
    ("principal", 4),
];

pub const SENIOR_LEVEL: u8 = 2;
pub const MID_LEVEL: u8 = 1;

/// Case-insensitive role lookup; unknown titles fall back to the default index.
pub fn encode_role(role: &str) -> u8 {
    lookup(ROLE_TABLE, role).unwrap_or(DEFAULT_ROLE_INDEX)
}

/// Case-insensitive level lookup ordered junior → principal.
pub fn encode_level(level: &str) -> u8 {
    lookup(LEVEL_TABLE, level).unwrap_or(DEFAULT_LEVEL_INDEX)
}

fn lookup(table: &[(&str, u8)], label: &str) -> Option<u8> {
    let needle = label.trim().to_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, index)| *index)
}

/// Role titles that imply the candidate should speak technically.
pub(crate) fn is_engineering_title(role: &str) -> bool {
    let role = role.to_lowercase();
    ["engineer", "developer", "scientist"]
        .iter()
        .any(|marker| role.contains(marker))
}

/// Data and ML titles, which the model path holds to a higher technical bar.
/// Both markers are plain case-insensitive substrings, so "MLOps" and "HTML" qualify.
pub(crate) fn is_data_title(role: &str) -> bool {
    let lowered = role.to_lowercase();
    lowered.contains("data") || lowered.contains("ml")
}

/// Raw substring hit count, overlapping occurrences excluded as `str::matches` does.
pub(crate) fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
