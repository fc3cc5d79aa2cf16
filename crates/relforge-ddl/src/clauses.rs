//! Partition and cluster clause builders
//!
//! Expressions are passed through verbatim; nothing here parses or validates SQL.

use relforge_core::ClusterBy;

/// `partition by <expr>`, or an empty string when no expression is configured
pub fn partition_by(expr: Option<&str>) -> String {
    match expr {
        Some(expr) => format!("partition by {}", expr),
        None => String::new(),
    }
}

/// `cluster by (<e1>,<e2>,...)`, or an empty string when clustering is not configured
///
/// Caller order is preserved and duplicates are kept. An empty list yields
/// `cluster by ()`, which the warehouse will reject.
pub fn cluster_by(cluster: Option<&ClusterBy>) -> String {
    match cluster {
        Some(cluster) => format!("cluster by ({})", cluster.columns().join(",")),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_absent() {
        assert_eq!(partition_by(None), "");
    }

    #[test]
    fn partition_expression_verbatim() {
        assert_eq!(partition_by(Some("dt")), "partition by dt");
        assert_eq!(
            partition_by(Some("date_trunc('day', created_at)")),
            "partition by date_trunc('day', created_at)"
        );
    }

    #[test]
    fn cluster_absent() {
        assert_eq!(cluster_by(None), "");
    }

    #[test]
    fn cluster_single_matches_one_element_list() {
        let single = ClusterBy::from("a");
        let list = ClusterBy::from(vec!["a"]);
        assert_eq!(cluster_by(Some(&single)), "cluster by (a)");
        assert_eq!(cluster_by(Some(&single)), cluster_by(Some(&list)));
    }

    #[test]
    fn cluster_list_joined_without_trailing_comma() {
        let list = ClusterBy::from(vec!["a", "b", "c"]);
        assert_eq!(cluster_by(Some(&list)), "cluster by (a,b,c)");
    }

    #[test]
    fn cluster_keeps_order_and_duplicates() {
        let list = ClusterBy::from(vec!["c", "a", "c"]);
        assert_eq!(cluster_by(Some(&list)), "cluster by (c,a,c)");
    }

    #[test]
    fn cluster_empty_list_is_empty_parens() {
        let list = ClusterBy::Many(Vec::new());
        assert_eq!(cluster_by(Some(&list)), "cluster by ()");
    }
}
