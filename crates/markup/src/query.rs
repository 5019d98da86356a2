//! Selector matching against a live tree
//!
//! Groups are matched with descendant semantics: group `i + 1` may match at
//! any depth below the node that matched group `i`. Matching restarts at
//! group 0 from every node, so independent chains anywhere in the tree are
//! all reported. Converging chains report the same node more than once.

use crate::arena::HtmlArena;
use crate::error::Result;
use crate::selector::{self, Comparator, SelectorToken, TokenGroup};
use crate::types::{HtmlNode, NodeId};

/// Does `node` satisfy every token of `group`?
pub fn matches_group(node: &HtmlNode, group: &[SelectorToken]) -> bool {
    if !node.is_element() {
        return false;
    }

    let mut index = 0;
    while index < group.len() {
        let satisfied = match &group[index] {
            SelectorToken::Element(tag) => node.tag_name() == tag.as_str(),
            SelectorToken::Id(id) => node.id() == Some(id.as_str()),
            SelectorToken::Class(class) => node.has_class(class),
            SelectorToken::AttributeName(name) => {
                let (comparator, value, consumed) = attribute_clause(&group[index + 1..]);
                index += consumed;
                match (node.attr(name), comparator) {
                    (Some(attr), Some(comparator)) => comparator.matches(attr, value),
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            }
            // only reachable for clauses without a name, e.g. `[="x"]`
            SelectorToken::AttributeCompare(_)
            | SelectorToken::AttributeValue(_)
            | SelectorToken::GroupSeparator => true,
        };
        if !satisfied {
            return false;
        }
        index += 1;
    }

    true
}

/// Read the comparator and value following an attribute name
///
/// Returns how many tokens were consumed. A comparator without a value
/// compares against the empty string.
pub(crate) fn attribute_clause(rest: &[SelectorToken]) -> (Option<Comparator>, &str, usize) {
    match rest {
        [SelectorToken::AttributeCompare(comparator), SelectorToken::AttributeValue(value), ..] => {
            (Some(*comparator), value.as_str(), 2)
        }
        [SelectorToken::AttributeCompare(comparator), ..] => (Some(*comparator), "", 1),
        [SelectorToken::AttributeValue(value), ..] => (Some(Comparator::Equals), value.as_str(), 1),
        _ => (None, "", 0),
    }
}

/// Find every descendant of `root` matching `selector`
pub fn query_selector(arena: &HtmlArena, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
    let groups = selector::parse(selector);
    let matches = query_groups(arena, root, &groups)?;
    tracing::debug!(
        "query {:?} under node {}: {} match(es)",
        selector,
        root,
        matches.len()
    );
    Ok(matches)
}

/// Match pre-parsed groups below `root`
///
/// Iterative work-list of `(node, group index)` pairs. Every node receives
/// exactly one group-0 entry (from its parent's group-0 entry), which is
/// where chains restart.
pub fn query_groups(arena: &HtmlArena, root: NodeId, groups: &[TokenGroup]) -> Result<Vec<NodeId>> {
    let mut matches = Vec::new();
    let Some(last) = groups.len().checked_sub(1) else {
        return Ok(matches);
    };

    let mut stack: Vec<(NodeId, usize)> = Vec::new();
    for &child_id in arena.get(root)?.children_ids().iter().rev() {
        stack.push((child_id, 0));
    }

    while let Some((node_id, group_index)) = stack.pop() {
        let node = arena.get(node_id)?;

        // Children stay candidates for the current group; pushed first so
        // the advanced chain below is explored before them.
        for &child_id in node.children_ids().iter().rev() {
            stack.push((child_id, group_index));
        }

        if matches_group(node, &groups[group_index]) {
            if group_index == last {
                matches.push(node_id);
            } else {
                for &child_id in node.children_ids().iter().rev() {
                    stack.push((child_id, group_index + 1));
                }
            }
        }
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_with(selectors: &[&str]) -> (HtmlArena, NodeId) {
        let mut arena = HtmlArena::new();
        let body = arena.create_element("body");
        for selector in selectors {
            let child = arena.create_element(selector);
            arena.node_mut(body).unwrap().append_child(child).unwrap();
        }
        (arena, body)
    }

    #[test]
    fn test_query_recurses_through_subtrees() {
        let (arena, body) = body_with(&[
            "div.one div.two div.three",
            "div.two div.one div.three",
            "div.three div.two div.one",
            "div.three div.one div.two",
            "div.four div.five section.needle div.six",
            "div.seven div.eight section.needle div.nine",
            "section.needle section.needle div.ten div.eleven",
        ]);

        assert_eq!(query_selector(&arena, body, "div.one").unwrap().len(), 4);
        assert_eq!(query_selector(&arena, body, ".needle").unwrap().len(), 4);
    }

    #[test]
    fn test_query_ignores_class_order() {
        let (arena, body) = body_with(&[
            "div.one.extra",
            "div.extra.one",
            "div.other span.one",
            "div.two",
            "span div.x.one.y",
        ]);

        let found = query_selector(&arena, body, "div.one").unwrap();
        assert_eq!(found.len(), 3);
        for id in found {
            assert!(arena.get(id).unwrap().has_class("one"));
        }
    }

    #[test]
    fn test_query_class_and_attribute() {
        let (arena, body) = body_with(&[
            "div.one div.two div.three div.five[data-test=\"do not find\"]",
            "div.four div.five[data-test=\"find\"] div.six",
        ]);

        let found = query_selector(&arena, body, ".five[data-test=\"find\"]").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(arena.get(found[0]).unwrap().get_attribute("data-test"), "find");
    }

    #[test]
    fn test_query_by_element_and_id() {
        let (arena, body) = body_with(&[
            "div span section article header",
            "video audio section ul table",
            "div#one div#two div#three",
            "div#two div#four div#five",
        ]);

        assert_eq!(query_selector(&arena, body, "section").unwrap().len(), 2);
        assert_eq!(query_selector(&arena, body, "#two").unwrap().len(), 2);
    }

    #[test]
    fn test_query_attribute_comparators() {
        let cases = [
            (
                [
                    "div[data-test=\"testneedletest\"] div[data-test=\"testtesttest\"] div[data-test=\"testtesttest\"]",
                    "div[data-test=\"testtesttest\"] div[data-test=\"no\"] div[data-test=\"testneedletest2\"]",
                ],
                "[data-test*=\"needle\"]",
            ),
            (
                [
                    "div[data-test=\"testcorrect\"] div[data-test=\"negativetest\"] div[data-test=\"negativetest\"]",
                    "div[data-test=\"negativetest\"] div[data-test=\"no\"] div[data-test=\"testcorrect\"]",
                ],
                "[data-test^=\"test\"]",
            ),
            (
                [
                    "div[data-test=\"testgood\"] div[data-test=\"testbad\"] div[data-test=\"testbad\"]",
                    "div[data-test=\"testbad\"] div[data-test=\"no\"] div[data-test=\"testgood\"]",
                ],
                "[data-test$=\"good\"]",
            ),
            (
                [
                    "div[data-test=\"test needle test\"] div[data-test=\"test test test\"] div[data-test=\"test test test\"]",
                    "div[data-test=\"test test test\"] div[data-test=\"negate\"] div[data-test=\"test needle test\"]",
                ],
                "[data-test~=\"needle\"]",
            ),
            (
                [
                    "div[data-test=\"test\"] div[data-test=\"rest-test\"] div[data-test=\"test-hyphen\"]",
                    "div[data-test=\"rest-test-\"] div[data-test=\"rest-test\"] div[data-test=\"rest-test\"]",
                ],
                "[data-test|=\"test\"]",
            ),
        ];

        for (subtrees, selector) in cases {
            let (arena, body) = body_with(&subtrees);
            assert_eq!(
                query_selector(&arena, body, selector).unwrap().len(),
                2,
                "selector {selector}"
            );
        }
    }

    #[test]
    fn test_query_attribute_presence() {
        let (arena, body) = body_with(&["button[disabled]", "button", "input[disabled=\"\"]"]);
        assert_eq!(query_selector(&arena, body, "[disabled]").unwrap().len(), 2);
    }

    #[test]
    fn test_query_descendant_groups_skip_levels() {
        let (arena, body) = body_with(&["div.one div.two div.three", "div.two div.one div.three"]);

        let found = query_selector(&arena, body, "div.one div.three").unwrap();
        assert_eq!(found.len(), 2);
        for id in found {
            assert!(arena.get(id).unwrap().has_class("three"));
        }
        assert!(query_selector(&arena, body, "div.three div.one").unwrap().is_empty());
    }

    #[test]
    fn test_query_reports_converging_chains_twice() {
        // a > a > a: the innermost `a` is reached from both outer ancestors
        let (arena, body) = body_with(&["a a a"]);

        let outer = arena.get(body).unwrap().children_ids()[0];
        let middle = arena.get(outer).unwrap().children_ids()[0];
        let inner = arena.get(middle).unwrap().children_ids()[0];

        let mut found = query_selector(&arena, body, "a a").unwrap();
        found.sort_unstable();
        let mut expected = vec![middle, inner, inner];
        expected.sort_unstable();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_query_never_matches_root() {
        let (arena, body) = body_with(&["body"]);
        let found = query_selector(&arena, body, "body").unwrap();
        assert_eq!(found.len(), 1);
        assert_ne!(found[0], body);
    }

    #[test]
    fn test_query_empty_selector() {
        let (arena, body) = body_with(&["div"]);
        assert!(query_selector(&arena, body, "").unwrap().is_empty());
        assert!(query_selector(&arena, body, "   ").unwrap().is_empty());
    }
}
