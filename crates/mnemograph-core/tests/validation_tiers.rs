//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the graph is INVALID.
//!
//! ## Tiers
//! - T0: Node Identity
//! - T1: Edge Weighting
//! - T2: Link Classification
//! - T3: Snapshot Fidelity

use mnemograph_core::primitives::{CONFIDENCE_KEY, IMPORTANCE_KEY, ROLE_KEY, TIMESTAMP_KEY};
use mnemograph_core::{
    AttrValue, Attributes, EdgeUpsert, Graph, GraphError, LinkType, NodeKey, WeightingPolicy,
    graph_from_bytes, graph_to_bytes,
};

fn meta(importance: i64, confidence: i64) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(IMPORTANCE_KEY.to_string(), AttrValue::Int(importance));
    attrs.insert(CONFIDENCE_KEY.to_string(), AttrValue::Int(confidence));
    attrs
}

fn policy() -> WeightingPolicy {
    WeightingPolicy::new(0.8).expect("policy")
}

// =============================================================================
// TIER T0: NODE IDENTITY
// =============================================================================

mod t0_node_identity {
    use super::*;

    /// T0.1: Re-inserting an id merges, second values win.
    #[test]
    fn reinsert_merges_with_second_call_winning() {
        let mut graph = Graph::new();
        let key = NodeKey::from("rec-1");

        let mut first = Attributes::new();
        first.insert(ROLE_KEY.to_string(), AttrValue::from("user"));
        first.insert(TIMESTAMP_KEY.to_string(), AttrValue::Int(100));
        let mut second = Attributes::new();
        second.insert(ROLE_KEY.to_string(), AttrValue::from("assistant"));
        second.insert("topic".to_string(), AttrValue::from("rust"));

        graph.upsert_node(key.clone(), first);
        graph.upsert_node(key.clone(), second);

        assert_eq!(graph.node_count(), 1);
        let attrs = graph.node(&key).expect("node");
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get(ROLE_KEY), Some(&AttrValue::from("assistant")));
        assert_eq!(attrs.get(TIMESTAMP_KEY), Some(&AttrValue::Int(100)));
        assert_eq!(attrs.get("topic"), Some(&AttrValue::from("rust")));
    }

    /// T0.2: Edges on unknown ids create the nodes.
    #[test]
    fn edge_on_unknown_ids_creates_nodes() {
        let mut graph = Graph::new();
        graph.upsert_edge(
            &NodeKey::from("x"),
            &NodeKey::from("y"),
            0.1,
            &Attributes::new(),
            &Attributes::new(),
            &policy(),
        );

        assert_eq!(graph.node_count(), 2);
    }
}

// =============================================================================
// TIER T1: EDGE WEIGHTING
// =============================================================================

mod t1_edge_weighting {
    use super::*;

    /// T1.1: The documented two-observation scenario.
    #[test]
    fn documented_scenario() {
        let mut graph = Graph::new();
        let a = NodeKey::from("a");
        let b = NodeKey::from("b");
        let top = meta(10, 10);

        assert_eq!(
            graph.upsert_edge(&a, &b, 0.9, &top, &top, &policy()),
            EdgeUpsert::Created
        );
        let first = graph.edge(&a, &b).expect("edge").clone();
        assert_eq!(first.cumulative_weight, 0.9);
        assert_eq!(first.link_type, LinkType::Structural);

        assert_eq!(
            graph.upsert_edge(&a, &b, 0.5, &top, &top, &policy()),
            EdgeUpsert::Updated
        );
        let edge = graph.edge(&a, &b).expect("edge");
        assert!((edge.cumulative_weight - 1.4).abs() < 1e-12);
        assert_eq!(edge.shared_concepts_count, 2);
        assert_eq!(edge.max_similarity, 0.9);
        assert_eq!(edge.link_type, LinkType::Structural);
    }

    /// T1.2: Default metadata gives a modifier of 0.25.
    #[test]
    fn default_metadata_quarter_weight() {
        let mut graph = Graph::new();
        let a = NodeKey::from("a");
        let b = NodeKey::from("b");

        graph.upsert_edge(&a, &b, 0.8, &Attributes::new(), &Attributes::new(), &policy());

        let edge = graph.edge(&a, &b).expect("edge");
        assert!((edge.cumulative_weight - 0.2).abs() < 1e-12);
    }

    /// T1.3: Asymmetric metadata averages the two products.
    #[test]
    fn asymmetric_metadata() {
        let mut graph = Graph::new();
        let a = NodeKey::from("a");
        let b = NodeKey::from("b");

        // (10*10 + 2*5) / 200 = 0.55
        graph.upsert_edge(&a, &b, 1.0, &meta(10, 10), &meta(2, 5), &policy());

        let edge = graph.edge(&a, &b).expect("edge");
        assert!((edge.cumulative_weight - 0.55).abs() < 1e-12);
    }

    /// T1.4: Observations on distinct pairs stay on distinct edges.
    #[test]
    fn distinct_pairs_do_not_mix() {
        let mut graph = Graph::new();
        let a = NodeKey::from("a");
        let b = NodeKey::from("b");
        let c = NodeKey::from("c");
        let none = Attributes::new();

        graph.upsert_edge(&a, &b, 0.4, &none, &none, &policy());
        graph.upsert_edge(&a, &c, 0.6, &none, &none, &policy());

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge(&a, &b).map(|e| e.shared_concepts_count), Some(1));
        assert_eq!(graph.edge(&c, &a).map(|e| e.max_similarity), Some(0.6));
        assert!(graph.edge(&b, &c).is_none());
    }
}

// =============================================================================
// TIER T2: LINK CLASSIFICATION
// =============================================================================

mod t2_link_classification {
    use super::*;

    /// T2.1: Low similarity after structural keeps structural.
    #[test]
    fn low_similarity_does_not_demote() {
        let mut graph = Graph::new();
        let a = NodeKey::from("a");
        let b = NodeKey::from("b");
        let none = Attributes::new();

        graph.upsert_edge(&a, &b, 0.99, &none, &none, &policy());
        for _ in 0..5 {
            graph.upsert_edge(&a, &b, 0.01, &none, &none, &policy());
        }

        let edge = graph.edge(&a, &b).expect("edge");
        assert_eq!(edge.link_type, LinkType::Structural);
        assert_eq!(edge.max_similarity, 0.99);
        assert_eq!(edge.shared_concepts_count, 6);
    }

    /// T2.2: Threshold equality stays associative.
    #[test]
    fn similarity_equal_to_threshold_is_associative() {
        let mut graph = Graph::new();
        let a = NodeKey::from("a");
        let b = NodeKey::from("b");

        graph.upsert_edge(&a, &b, 0.8, &Attributes::new(), &Attributes::new(), &policy());

        assert_eq!(graph.edge(&a, &b).map(|e| e.link_type), Some(LinkType::Associative));
        assert_eq!(graph.structural_edge_count(), 0);
    }
}

// =============================================================================
// TIER T3: SNAPSHOT FIDELITY
// =============================================================================

mod t3_snapshot_fidelity {
    use super::*;

    /// T3.1: Nodes, attributes and edge attributes survive the byte format.
    #[test]
    fn bytes_roundtrip_is_isomorphic() {
        let mut graph = Graph::new();
        let mut attrs = Attributes::new();
        attrs.insert(ROLE_KEY.to_string(), AttrValue::from("user"));
        attrs.insert("pinned".to_string(), AttrValue::Bool(true));
        graph.upsert_node(NodeKey::from("a"), attrs);
        graph.upsert_edge(
            &NodeKey::from("a"),
            &NodeKey::from("b"),
            0.85,
            &meta(7, 3),
            &meta(9, 9),
            &policy(),
        );

        let bytes = graph_to_bytes(&graph).expect("serialize");
        let restored = graph_from_bytes(&bytes).expect("deserialize");

        assert_eq!(restored.node_count(), 2);
        assert_eq!(
            restored.node(&NodeKey::from("a")),
            graph.node(&NodeKey::from("a"))
        );
        assert_eq!(
            restored.edge(&NodeKey::from("b"), &NodeKey::from("a")),
            graph.edge(&NodeKey::from("a"), &NodeKey::from("b"))
        );
    }

    /// T3.2: Garbage is rejected as a deserialization error.
    #[test]
    fn garbage_rejected() {
        let result = graph_from_bytes(b"not a snapshot at all");
        assert!(matches!(result, Err(GraphError::DeserializationError(_))));
    }
}
