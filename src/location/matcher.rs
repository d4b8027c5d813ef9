//! Fuzzy reconciliation of scraped location text
//!
//! Addresses on the job board are written finest-first ("Area, City,
//! Country"), so both sides are compared token by token from the right. Each
//! position takes two thirds of the weight still unassigned, which makes the
//! country dominate, then the city, then the area. A match is accepted only
//! when it earns at least the full weight of a perfect rightmost token.
//!
//! Three positions leave 1/27 of the weight unassigned; reported scores are
//! divided by the assigned total so a perfect match scores exactly 1.

use strsim::levenshtein;
use tracing::{debug, instrument};

use crate::location::gazetteer::{Gazetteer, GazetteerEntry};

/// Number of trailing tokens compared
const COMPARE_DEPTH: usize = 3;

/// Share of the remaining weight consumed by each position
const WEIGHT_RATIO: f64 = 2.0 / 3.0;

/// Weight assigned across all compared positions
const ASSIGNED_WEIGHT: f64 = 1.0 - (1.0 - WEIGHT_RATIO) * (1.0 - WEIGHT_RATIO) * (1.0 - WEIGHT_RATIO);

/// Minimum reported score of an accepted match
///
/// This is a perfect rightmost token and nothing else, `(2/3) / (26/27)`.
pub const MATCH_THRESHOLD: f64 = WEIGHT_RATIO / ASSIGNED_WEIGHT;

const TOKEN_SEPARATOR: &str = ", ";

/// Outcome of matching one location string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    /// Best entry, `None` when nothing reached the threshold
    pub entry: Option<&'a GazetteerEntry>,

    /// Score of the best candidate in `[0, 1]`, reported even when rejected
    pub score: f64,
}

impl MatchResult<'_> {
    pub fn is_match(&self) -> bool {
        self.entry.is_some()
    }
}

struct Candidate {
    entry: GazetteerEntry,
    tokens: Vec<String>,
}

/// Scores free text against every gazetteer entry
pub struct LocationMatcher {
    candidates: Vec<Candidate>,
}

impl LocationMatcher {
    /// Build a matcher over a loaded gazetteer
    pub fn new(gazetteer: Gazetteer) -> Self {
        let candidates = gazetteer
            .entries()
            .iter()
            .map(|entry| Candidate {
                tokens: tokenize(&entry.address()),
                entry: entry.clone(),
            })
            .collect();
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Best gazetteer entry for `location`
    ///
    /// Ties keep the entry that comes first in gazetteer order.
    #[instrument(skip(self), level = "debug")]
    pub fn best_match(&self, location: &str) -> MatchResult<'_> {
        if location.trim().is_empty() {
            return MatchResult {
                entry: None,
                score: 0.0,
            };
        }

        let tokens = tokenize(location);
        let mut best: Option<&Candidate> = None;
        let mut best_weight = 0.0;
        for candidate in &self.candidates {
            let weight = weighted_similarity(&tokens, &candidate.tokens);
            if weight > best_weight {
                best_weight = weight;
                best = Some(candidate);
            }
        }

        let score = best_weight / ASSIGNED_WEIGHT;
        let entry = best
            .filter(|_| best_weight >= WEIGHT_RATIO)
            .map(|candidate| &candidate.entry);
        debug!(
            matched = ?entry.map(GazetteerEntry::address),
            score,
            "Scored location"
        );
        MatchResult { entry, score }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(TOKEN_SEPARATOR).map(String::from).collect()
}

/// Similarity of two tokenized addresses in `[0, 1]`
#[cfg(test)]
fn score_tokens<S: AsRef<str>, T: AsRef<str>>(target: &[S], candidate: &[T]) -> f64 {
    weighted_similarity(target, candidate) / ASSIGNED_WEIGHT
}

/// Sum of per-position similarities times their unnormalised weights
fn weighted_similarity<S: AsRef<str>, T: AsRef<str>>(target: &[S], candidate: &[T]) -> f64 {
    let mut score = 0.0;
    let mut remaining = 1.0;

    for position in 0..COMPARE_DEPTH {
        let left = from_end(target, position);
        let right = from_end(candidate, position);
        let weight = remaining * WEIGHT_RATIO;
        score += weight * token_similarity(left, right);
        remaining -= weight;
    }
    score
}

fn from_end<S: AsRef<str>>(tokens: &[S], position: usize) -> &str {
    tokens
        .len()
        .checked_sub(position + 1)
        .map(|index| tokens[index].as_ref())
        .unwrap_or("")
}

/// `1 - distance / (len(a) + len(b))`, with two empty tokens scoring 1
fn token_similarity(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / total as f64
}
