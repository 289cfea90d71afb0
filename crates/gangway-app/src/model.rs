// Copyright 2026 The gangway authors
// Licensed under the Apache License, Version 2.0

use std::collections::{BTreeSet, HashMap};

pub const FIXED_COLUMNS: [&str; 3] = ["Hostname", "IP", "OS"];

/// One selectable host as delivered by the inventory source. The hostname is
/// the selection key; labels carry no inherent order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub hostname: String,
    pub ip: String,
    pub os: String,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub title: String,
}

impl Column {
    pub fn value_of<'a>(&self, node: &'a Node) -> &'a str {
        match self.index {
            0 => &node.hostname,
            1 => &node.ip,
            2 => &node.os,
            _ => node
                .labels
                .get(&self.title)
                .map(String::as_str)
                .unwrap_or_default(),
        }
    }
}

/// Fixed columns first, then the union of label keys across the inventory in
/// lexicographic order. The explicit sort keeps the layout independent of
/// label-map iteration order.
pub fn derive_columns(nodes: &[Node]) -> Vec<Column> {
    let mut label_keys = BTreeSet::new();
    for node in nodes {
        for key in node.labels.keys() {
            label_keys.insert(key.clone());
        }
    }

    FIXED_COLUMNS
        .iter()
        .map(|title| (*title).to_owned())
        .chain(label_keys)
        .enumerate()
        .map(|(index, title)| Column { index, title })
        .collect()
}

/// One display row aligned to the column ordinals; absent labels render as
/// empty cells.
pub fn row_cells(node: &Node, columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|column| column.value_of(node).to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Column, FIXED_COLUMNS, Node, derive_columns, row_cells};
    use std::collections::HashMap;

    fn node(hostname: &str, labels: &[(&str, &str)]) -> Node {
        Node {
            hostname: hostname.to_owned(),
            ip: "10.0.0.1".to_owned(),
            os: "Ubuntu 22.04".to_owned(),
            labels: labels
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn fixed_columns_precede_sorted_label_keys() {
        let nodes = vec![
            node("a", &[("zone", "us-east-1a"), ("env", "dev")]),
            node("b", &[("team", "infra")]),
        ];

        let titles = derive_columns(&nodes)
            .into_iter()
            .map(|column| column.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Hostname", "IP", "OS", "env", "team", "zone"]);
    }

    #[test]
    fn derivation_is_idempotent() {
        let nodes = vec![
            node("a", &[("env", "dev"), ("AZ", "us-east-1a")]),
            node("b", &[("Team", "dev")]),
        ];

        let first = derive_columns(&nodes);
        let second = derive_columns(&nodes);
        assert_eq!(first, second);
        for (index, column) in first.iter().enumerate() {
            assert_eq!(column.index, index);
        }
    }

    #[test]
    fn label_key_sort_is_byte_wise() {
        let nodes = vec![node("a", &[("Team", "dev"), ("az", "1a"), ("AZ", "1b")])];

        let titles = derive_columns(&nodes)
            .into_iter()
            .skip(FIXED_COLUMNS.len())
            .map(|column| column.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["AZ", "Team", "az"]);
    }

    #[test]
    fn empty_inventory_keeps_fixed_columns() {
        let columns = derive_columns(&[]);
        assert_eq!(columns.len(), FIXED_COLUMNS.len());
        assert_eq!(columns[0].title, "Hostname");
    }

    #[test]
    fn row_cells_align_to_ordinals_with_empty_gaps() {
        let nodes = vec![
            node("a", &[("env", "dev")]),
            node("b", &[("team", "infra")]),
        ];
        let columns = derive_columns(&nodes);

        assert_eq!(
            row_cells(&nodes[0], &columns),
            vec!["a", "10.0.0.1", "Ubuntu 22.04", "dev", ""],
        );
        assert_eq!(
            row_cells(&nodes[1], &columns),
            vec!["b", "10.0.0.1", "Ubuntu 22.04", "", "infra"],
        );
    }

    #[test]
    fn column_value_resolves_fixed_fields_by_ordinal() {
        let target = node("a", &[]);
        let ip_column = Column {
            index: 1,
            title: "IP".to_owned(),
        };
        assert_eq!(ip_column.value_of(&target), "10.0.0.1");
    }
}
