//! Free-text airport search: query cleaning and fallback strategy.
//!
//! User-typed queries like "Miami International Airport" match poorly
//! against the flight API's search. Cleaning lowercases the input,
//! strips non-alphabetic characters and aviation filler words (English
//! and Spanish), and the search then tries up to three query variants
//! in order, keeping the first one that returns anything.

use std::collections::HashSet;
use std::future::Future;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::error::FlightError;

use super::types::Airport;

/// Filler words removed during query cleaning.
const STOPWORDS: &[&str] = &[
    "airport",
    "international",
    "intl",
    "airfield",
    "aeropuerto",
    "internacional",
    "terminal",
    "de",
    "del",
    "la",
    "el",
    "los",
    "las",
    "the",
    "of",
];

static NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]+").expect("valid regex"));

/// Minimum query length; anything shorter returns no results.
pub const MIN_QUERY_LEN: usize = 2;

/// Source of airport search results.
///
/// Implemented by the real flight API client and by the mock client in
/// tests; the fallback strategy is written against this seam.
pub trait AirportSource {
    /// Search airports matching a query, up to `limit` results.
    fn airports(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Airport>, FlightError>> + Send;
}

/// Normalize a free-text query.
///
/// Lowercases, replaces non-alphabetic runs with spaces, drops stopwords
/// and collapses whitespace. Cleaning an already-cleaned query returns
/// the same string.
pub fn clean_query(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let alpha = NON_ALPHA.replace_all(&lowered, " ");

    alpha
        .split_whitespace()
        .filter(|word| !STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the ordered list of query variants to try.
///
/// At most three: the cleaned query, the original (when it differs), and
/// the first word of the cleaned query (when the cleaned query has more
/// than one word). Duplicates are removed, order preserved.
pub fn candidate_queries(raw: &str) -> Vec<String> {
    let original = raw.trim().to_string();
    let cleaned = clean_query(&original);

    let mut candidates = Vec::with_capacity(3);
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    push(cleaned.clone());
    push(original);

    if let Some(first_word) = cleaned.split_whitespace().next() {
        if first_word != cleaned {
            push(first_word.to_string());
        }
    }

    candidates
}

/// Collapse results to one entry per airport code, keeping the first.
pub fn dedupe_by_code(airports: Vec<Airport>) -> Vec<Airport> {
    let mut seen: HashSet<String> = HashSet::with_capacity(airports.len());
    airports
        .into_iter()
        .filter(|airport| seen.insert(airport.code.to_uppercase()))
        .collect()
}

/// Search airports with cleaning and fallback.
///
/// Queries shorter than [`MIN_QUERY_LEN`] characters return an empty
/// list without touching the remote API. Each candidate failure is
/// logged and skipped; if every candidate fails or matches nothing, the
/// result is an empty list rather than an error.
#[instrument(skip(source), fields(query = %raw_query))]
pub async fn run_search<S: AirportSource>(
    source: &S,
    raw_query: &str,
    limit: u32,
) -> Vec<Airport> {
    let trimmed = raw_query.trim();
    if trimmed.chars().count() < MIN_QUERY_LEN {
        debug!("Query too short, skipping remote search");
        return Vec::new();
    }

    for candidate in candidate_queries(trimmed) {
        match source.airports(&candidate, limit).await {
            Ok(results) if !results.is_empty() => {
                debug!(candidate = %candidate, count = results.len(), "Candidate matched");
                return dedupe_by_code(results);
            }
            Ok(_) => {
                debug!(candidate = %candidate, "Candidate returned no results");
            }
            Err(e) => {
                warn!(candidate = %candidate, error = %e, "Candidate search failed, skipping");
            }
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flights::mock::MockFlightClient;
    use pretty_assertions::assert_eq;

    fn airport(code: &str, name: &str) -> Airport {
        Airport {
            code: code.to_string(),
            name: name.to_string(),
            city: None,
            country: None,
        }
    }

    #[test]
    fn cleaning_strips_stopwords() {
        assert_eq!(clean_query("Miami International Airport"), "miami");
        assert_eq!(clean_query("Aeropuerto Internacional de La Habana"), "habana");
    }

    #[test]
    fn cleaning_strips_non_alphabetic() {
        assert_eq!(clean_query("Havana (HAV) - Terminal 3!"), "havana hav");
    }

    #[test]
    fn cleaning_is_idempotent() {
        for raw in ["Miami International Airport", "new york jfk", "  Santiago de Cuba  "] {
            let once = clean_query(raw);
            assert_eq!(clean_query(&once), once);
        }
    }

    #[test]
    fn candidates_are_ordered_and_deduped() {
        let candidates = candidate_queries("Miami International Airport");
        assert_eq!(
            candidates,
            vec!["miami".to_string(), "Miami International Airport".to_string()]
        );

        let candidates = candidate_queries("varadero beach");
        assert_eq!(
            candidates,
            vec![
                "varadero beach".to_string(),
                "varadero".to_string(),
            ]
        );
    }

    #[test]
    fn candidates_fall_back_to_original_when_all_stopwords() {
        let candidates = candidate_queries("Airport International");
        assert_eq!(candidates, vec!["Airport International".to_string()]);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let merged = dedupe_by_code(vec![
            airport("HAV", "Jose Marti International"),
            airport("VRA", "Juan Gualberto Gomez"),
            airport("hav", "Jose Marti (duplicate)"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Jose Marti International");
    }

    #[tokio::test]
    async fn short_query_makes_no_remote_call() {
        let mock = MockFlightClient::new();
        let results = run_search(&mock, "x", 10).await;
        assert!(results.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn havana_returns_single_hav_entry() {
        let mock = MockFlightClient::new();
        mock.set_response("havana", vec![airport("HAV", "Jose Marti International")]);

        let results = run_search(&mock, "havana", 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "HAV");
    }

    #[tokio::test]
    async fn falls_back_to_original_query() {
        let mock = MockFlightClient::new();
        // Cleaned variant matches nothing; the raw query does.
        mock.set_response("Miami International Airport", vec![airport("MIA", "Miami Intl")]);

        let results = run_search(&mock, "Miami International Airport", 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "MIA");
        assert_eq!(
            mock.calls(),
            vec![
                "miami".to_string(),
                "Miami International Airport".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn candidate_error_is_skipped() {
        let mock = MockFlightClient::new();
        mock.fail_on("santiago cuba");
        mock.set_response("Santiago de Cuba", vec![airport("SCU", "Antonio Maceo")]);

        let results = run_search(&mock, "Santiago de Cuba", 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "SCU");
    }

    #[tokio::test]
    async fn all_candidates_failing_yields_empty() {
        let mock = MockFlightClient::new();
        mock.fail_on("havana");
        let results = run_search(&mock, "havana", 10).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn duplicate_codes_in_response_are_merged() {
        let mock = MockFlightClient::new();
        mock.set_response(
            "havana",
            vec![
                airport("HAV", "Jose Marti International"),
                airport("HAV", "Jose Marti International"),
            ],
        );

        let results = run_search(&mock, "havana", 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "HAV");
    }
}
