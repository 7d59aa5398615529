//! Breadth-first searches over the states reachable by rewriting.
//!
//! Neither search bounds the number of states it visits. A rule set that
//! keeps producing new expressions makes them run forever.

use std::collections::HashMap;

use log::{debug, trace};

use super::expr::*;
use super::rule::*;

/// All distinct expressions reachable from `start`, in discovery order.
/// `start` itself is always the first element.
pub fn reachable(start: &Expr, rules: &[Rule]) -> Vec<Expr> {
    let mut queue = vec![start.clone()];

    let mut i = 0;
    while i < queue.len() {
        let curr = queue[i].clone();
        trace!("expanding {}", curr);

        for rule in rules {
            for adj in rule.applications(&curr) {
                if !queue.contains(&adj) {
                    trace!("discovered {}", adj);
                    queue.push(adj);
                }
            }
        }
        i += 1;
    }

    debug!("{} state(s) reachable from {}", queue.len(), start);
    queue
}

/// Shortest chain of single rewrites leading from `start` to `target`.
///
/// An empty result means the reachable set was exhausted without meeting
/// `target`.
pub fn find_path(start: &Expr, target: &Expr, rules: &[Rule]) -> Vec<Expr> {
    let mut queue = vec![start.clone()];
    let mut parent: Vec<Option<usize>> = vec![None];
    let mut used: HashMap<i64, Vec<usize>> = HashMap::new();
    used.entry(start.hash()).or_default().push(0);

    let mut found = None;

    let mut i = 0;
    while i < queue.len() {
        if queue[i] == *target {
            found = Some(i);
            break;
        }

        let curr = queue[i].clone();
        trace!("expanding {}", curr);

        for rule in rules {
            for adj in rule.applications(&curr) {
                let bucket = used.entry(adj.hash()).or_default();
                if bucket.iter().any(|&j| queue[j] == adj) {
                    continue;
                }
                trace!("discovered {}", adj);
                bucket.push(queue.len());
                queue.push(adj);
                parent.push(Some(i));
            }
        }
        i += 1;
    }

    let mut path = Vec::new();
    while let Some(index) = found {
        path.push(queue[index].clone());
        found = parent[index];
    }
    path.reverse();

    debug!("searched {} state(s) for {} ?= {}, path of length {}", queue.len(), start, target, path.len());
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(rules: &[(&str, &str)]) -> Vec<Rule> {
        rules
            .iter()
            .map(|(head, body)| Rule::new(head.parse().unwrap(), body.parse().unwrap()))
            .collect()
    }

    fn assert_path_is_witnessed(path: &[Expr], rules: &[Rule]) {
        for pair in path.windows(2) {
            assert!(
                rules.iter().any(|rule| rule.applications(&pair[0]).contains(&pair[1])),
                "no single rewrite takes {} to {}", pair[0], pair[1],
            );
        }
    }

    #[test_log::test]
    fn no_rules_reach_only_the_start() {
        let start = expr!(f(a, *x));
        assert_eq!(reachable(&start, &[]), vec![start]);
    }

    #[test_log::test]
    fn reachable_states_come_in_discovery_order_without_duplicates() {
        let rules = rules(&[("a", "b"), ("b", "c")]);
        assert_eq!(
            reachable(&expr!(f(a, a)), &rules),
            vec![
                expr!(f(a, a)),
                expr!(f(b, a)),
                expr!(f(a, b)),
                expr!(f(b, b)),
                expr!(f(c, a)),
                expr!(f(a, c)),
                expr!(f(c, b)),
                expr!(f(b, c)),
                expr!(f(c, c)),
            ],
        );
    }

    #[test_log::test]
    fn cycles_terminate() {
        let rules = rules(&[("plus(*x, *y)", "plus(*y, *x)")]);
        assert_eq!(
            reachable(&expr!(plus(a, b)), &rules),
            vec![expr!(plus(a, b)), expr!(plus(b, a))],
        );
    }

    #[test_log::test]
    fn direct_rewrite_is_a_two_step_path() {
        let rules = rules(&[("a", "b")]);
        assert_eq!(find_path(&expr!(a), &expr!(b), &rules), vec![expr!(a), expr!(b)]);
    }

    #[test_log::test]
    fn unreachable_target_gives_an_empty_path() {
        let rules = rules(&[("a", "b")]);
        assert!(find_path(&expr!(a), &expr!(c), &rules).is_empty());
    }

    #[test_log::test]
    fn start_equal_to_target_is_a_one_step_path() {
        assert_eq!(find_path(&expr!(f(a)), &expr!(f(a)), &[]), vec![expr!(f(a))]);
    }

    #[test_log::test]
    fn path_is_shortest_and_witnessed() {
        let rules = rules(&[
            ("plus(*x, zero)", "*x"),
            ("plus(*x, succ(*y))", "succ(plus(*x, *y))"),
        ]);
        let start: Expr = "plus(succ(zero), succ(succ(zero)))".parse().unwrap();
        let target: Expr = "succ(succ(succ(zero)))".parse().unwrap();

        let path = find_path(&start, &target, &rules);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&target));
        assert_eq!(path.len(), 4);
        assert_path_is_witnessed(&path, &rules);
    }

    #[test_log::test]
    fn bidirectional_rules_prove_equalities_both_ways() {
        let mut rules = rules(&[("mul(*x, one)", "*x")]);
        let reversed = rules[0].reversed();
        rules.push(reversed);

        let path = find_path(&expr!(f(a)), &expr!(f(mul(a, one))), &rules);
        assert_eq!(path, vec![expr!(f(a)), expr!(f(mul(a, one)))]);
        assert_path_is_witnessed(&path, &rules);
    }
}
