// Copyright 2026 The gangway authors
// Licensed under the Apache License, Version 2.0

use crate::model::{Column, Node};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    All,
    Column(usize),
}

/// Ranked filter over the inventory. An empty query is the identity; a query
/// matching nothing yields an empty set, never an error.
pub fn filter_nodes(
    nodes: &[Node],
    columns: &[Column],
    query: &str,
    scope: SearchScope,
) -> Vec<Node> {
    if query.is_empty() {
        return nodes.to_vec();
    }

    let query = query.to_lowercase();
    let buckets = match scope {
        SearchScope::All => composite_buckets(nodes),
        SearchScope::Column(index) => {
            let Some(column) = columns.get(index) else {
                return Vec::new();
            };
            column_buckets(nodes, column)
        }
    };

    rank_keys(&query, &buckets)
        .into_iter()
        .flat_map(|key| buckets[key].iter().map(|node| (*node).clone()))
        .collect()
}

/// Search text for unscoped queries: lowercased fixed fields, then label
/// values in ascending key order. Sorting by key is what keeps the text
/// reproducible over unordered label storage.
pub fn composite_text(node: &Node) -> String {
    let mut text = format!(
        "{} {} {}",
        node.hostname.to_lowercase(),
        node.ip.to_lowercase(),
        node.os.to_lowercase(),
    );
    let mut keys = node.labels.keys().collect::<Vec<_>>();
    keys.sort();
    for key in keys {
        text.push(' ');
        text.push_str(&node.labels[key].to_lowercase());
    }
    text
}

fn composite_buckets(nodes: &[Node]) -> BTreeMap<String, Vec<&Node>> {
    let mut buckets: BTreeMap<String, Vec<&Node>> = BTreeMap::new();
    for node in nodes {
        buckets.entry(composite_text(node)).or_default().push(node);
    }
    buckets
}

fn column_buckets<'a>(nodes: &'a [Node], column: &Column) -> BTreeMap<String, Vec<&'a Node>> {
    let mut buckets: BTreeMap<String, Vec<&Node>> = BTreeMap::new();
    for node in nodes {
        buckets
            .entry(column.value_of(node).to_lowercase())
            .or_default()
            .push(node);
    }
    buckets
}

/// Bucket keys that fuzzy-match the query, best first. Candidates arrive in
/// lexicographic order from the map and the sort is stable, so equal scores
/// tie-break lexicographically rather than by storage order.
fn rank_keys<'a, V>(query: &str, buckets: &'a BTreeMap<String, V>) -> Vec<&'a str> {
    let mut ranked = buckets
        .keys()
        .filter(|key| matches_subsequence(query, key))
        .map(|key| (strsim::levenshtein(query, key), key.as_str()))
        .collect::<Vec<_>>();
    ranked.sort_by_key(|(score, _)| *score);
    ranked.into_iter().map(|(_, key)| key).collect()
}

fn matches_subsequence(query: &str, target: &str) -> bool {
    let mut target_chars = target.chars();
    query
        .chars()
        .all(|wanted| target_chars.by_ref().any(|candidate| candidate == wanted))
}
