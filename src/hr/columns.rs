//! Header auto-mapping for uploaded HR tables

use crate::error::{Result, RetentionError};
use log::{debug, warn};
use std::collections::HashSet;
use strsim::normalized_levenshtein;

/// Minimum similarity for a header to be mapped onto an expected column
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub original: String,
    pub mapped: Option<String>,
    pub similarity: f64,
}

fn normalize(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps each input header to its closest expected column.
///
/// Headers are visited in input order; an expected column already claimed
/// by an earlier header is not handed out twice.
pub fn auto_map_columns(headers: &[String], expected: &[&str], threshold: f64) -> Vec<ColumnMapping> {
    let mut used: HashSet<&str> = HashSet::new();
    let mut mappings = Vec::with_capacity(headers.len());

    for header in headers {
        let normalized = normalize(header);
        let best = expected
            .iter()
            .map(|candidate| (*candidate, normalized_levenshtein(&normalized, &normalize(candidate))))
            .fold(None, |best: Option<(&str, f64)>, (candidate, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((candidate, score)),
            });

        let mapping = match best {
            Some((candidate, score)) if score >= threshold && !used.contains(candidate) => {
                used.insert(candidate);
                ColumnMapping {
                    original: header.clone(),
                    mapped: Some(candidate.to_string()),
                    similarity: score,
                }
            }
            Some((_, score)) => ColumnMapping {
                original: header.clone(),
                mapped: None,
                similarity: score,
            },
            None => ColumnMapping {
                original: header.clone(),
                mapped: None,
                similarity: 0.0,
            },
        };

        debug!("Column '{}' -> {:?} ({:.2})", mapping.original, mapping.mapped, mapping.similarity);
        mappings.push(mapping);
    }

    mappings
}

/// Rewrites headers to canonical names and checks every expected column is covered
pub fn canonical_headers(headers: &[String], expected: &[&str], table: &str) -> Result<Vec<String>> {
    let mappings = auto_map_columns(headers, expected, DEFAULT_MATCH_THRESHOLD);

    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|col| !mappings.iter().any(|m| m.mapped.as_deref() == Some(*col)))
        .collect();

    if !missing.is_empty() {
        return Err(RetentionError::InvalidInput(format!(
            "{} table is missing required columns: {}",
            table,
            missing.join(", ")
        )));
    }

    // An unmapped header spelled like a claimed column would shadow it
    Ok(mappings
        .into_iter()
        .enumerate()
        .map(|(idx, m)| match m.mapped {
            Some(mapped) => mapped,
            None if expected.contains(&m.original.as_str()) => {
                warn!("{} table: ignoring duplicate column '{}' at position {}", table, m.original, idx + 1);
                format!("{}__unmapped_{}", m.original, idx)
            }
            None => m.original,
        })
        .collect())
}
