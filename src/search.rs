//! Fuzzy label search.

use std::collections::HashSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::ConceptGraph;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Concepts whose label or id fuzzily matches a query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchMatches {
    matches: HashSet<usize>,
}

impl SearchMatches {
    /// `None` for a blank query.
    pub fn build(graph: &ConceptGraph, query: &str) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        let matches = graph
            .concepts()
            .iter()
            .enumerate()
            .filter(|(_, concept)| {
                fuzzy_match_score(&matcher, &concept.label, query).is_some()
                    || fuzzy_match_score(&matcher, &concept.id, query).is_some()
            })
            .map(|(index, _)| index)
            .collect();

        Some(Self { matches })
    }

    pub fn contains(&self, index: usize) -> bool {
        self.matches.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
