use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};

/// A `(from, to)` pair as returned by a hierarchy query.
///
/// For narrower queries `from` is the broader term; for broader queries `from` is the
/// narrower one. Either way traversal follows `from -> to`.
pub type HierarchyEdge = (String, String);

/// Returns every identifier reachable from `start`, in breadth-first order.
///
/// Adjacency keeps the order in which edges arrived, so siblings come out in the same
/// order the remote service listed them. Each identifier appears at most once.
///
/// ```
/// use lca_vocab_core::hierarchy::resolve_closure;
///
/// let edges = [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")];
/// assert_eq!(resolve_closure(&edges, "a", false), vec!["b", "c", "d"]);
/// ```
pub fn resolve_closure<S: AsRef<str>>(edges: &[(S, S)], start: &str, include_start: bool) -> Vec<String> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::with_capacity(edges.len(), edges.len());
    for (from, to) in edges {
        graph.add_edge(from.as_ref(), to.as_ref(), ());
    }

    let mut ordered = Vec::new();
    let mut seen = HashSet::new();
    if include_start {
        ordered.push(start.to_string());
        seen.insert(start);
    }

    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        if !graph.contains_node(current) {
            continue;
        }
        for next in graph.neighbors_directed(current, Direction::Outgoing) {
            // Cycles and diamonds both end here.
            if !seen.insert(next) {
                continue;
            }
            ordered.push(next.to_string());
            queue.push_back(next);
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const NO_EDGES: [(&str, &str); 0] = [];

    #[rstest]
    #[case(true, vec!["start"])]
    #[case(false, vec![])]
    fn test_no_edges(#[case] include_start: bool, #[case] expected: Vec<&str>) {
        assert_eq!(resolve_closure(&NO_EDGES, "start", include_start), expected);
    }

    #[test]
    fn test_diamond_visits_shared_child_once() {
        // Shape: A -> B, A -> C, B -> D, C -> D
        let edges = [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")];
        assert_eq!(resolve_closure(&edges, "A", false), vec!["B", "C", "D"]);
        assert_eq!(resolve_closure(&edges, "A", true), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_self_loop_terminates() {
        let edges = [("A", "A"), ("A", "B")];
        assert_eq!(resolve_closure(&edges, "A", true), vec!["A", "B"]);

        // Without the start node the loop makes A reachable from itself, once.
        assert_eq!(resolve_closure(&edges, "A", false), vec!["A", "B"]);
    }

    #[test]
    fn test_longer_cycle_terminates() {
        let edges = [("A", "B"), ("B", "C"), ("C", "A")];
        assert_eq!(resolve_closure(&edges, "A", true), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_sibling_order_follows_edge_arrival() {
        let edges = [("root", "z"), ("root", "a"), ("z", "z1"), ("a", "a1"), ("root", "m")];
        assert_eq!(resolve_closure(&edges, "root", false), vec!["z", "a", "m", "z1", "a1"]);
    }

    #[test]
    fn test_breadth_before_depth() {
        // A deep chain under the first child must not jump ahead of the second child.
        let edges = [("r", "c1"), ("c1", "g1"), ("g1", "gg1"), ("r", "c2")];
        assert_eq!(resolve_closure(&edges, "r", false), vec!["c1", "c2", "g1", "gg1"]);
    }

    #[test]
    fn test_duplicate_edges_are_ignored() {
        let edges = vec![
            ("p".to_string(), "c".to_string()),
            ("p".to_string(), "c".to_string()),
        ];
        assert_eq!(resolve_closure(&edges, "p", false), vec!["c"]);
    }

    #[test]
    fn test_unreachable_edges_are_not_followed() {
        let edges = [("x", "y"), ("a", "b")];
        assert_eq!(resolve_closure(&edges, "a", false), vec!["b"]);
    }
}
