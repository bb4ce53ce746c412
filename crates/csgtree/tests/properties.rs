//! Property tests over generated block structures.

use std::collections::HashMap;

use csgtree::{classify, parse_lines, CsgError, LineKind, NodeCategory, VariantRegistry};
use proptest::prelude::*;

const OPERATORS: &[&str] = &["union", "difference", "multmatrix"];
const PRIMITIVES: &[&str] = &["cube", "sphere", "cylinder"];
const PARAMS: &[&str] = &["", "size = 1", "r = 2", "[[1, 0], [0, 1]]"];

#[derive(Debug, Clone)]
enum Event {
    Open(usize, usize),
    Leaf(usize, usize),
    Close,
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        2 => (0..OPERATORS.len(), 0..PARAMS.len()).prop_map(|(n, p)| Event::Open(n, p)),
        3 => (0..PRIMITIVES.len(), 0..PARAMS.len()).prop_map(|(n, p)| Event::Leaf(n, p)),
        2 => Just(Event::Close),
    ]
}

/// Render events as indented CSG lines, dropping closes at top level and
/// closing whatever is left open at the end.
fn render(events: &[Event]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    for event in events {
        let indent = "\t".repeat(depth);
        match *event {
            Event::Open(n, p) => {
                lines.push(format!("{indent}{}({}) {{", OPERATORS[n], PARAMS[p]));
                depth += 1;
            }
            Event::Leaf(n, p) => {
                lines.push(format!("{indent}{}({});", PRIMITIVES[n], PARAMS[p]));
            }
            Event::Close if depth > 0 => {
                depth -= 1;
                lines.push(format!("{}}}", "\t".repeat(depth)));
            }
            Event::Close => {}
        }
    }
    while depth > 0 {
        depth -= 1;
        lines.push(format!("{}}}", "\t".repeat(depth)));
    }
    lines
}

proptest! {
    #[test]
    fn balanced_input_parses(events in prop::collection::vec(arb_event(), 0..60)) {
        let lines = render(&events);
        let parsed = parse_lines(&lines).unwrap();

        let opens = lines
            .iter()
            .filter(|l| matches!(classify(l).kind, LineKind::OperatorOpen { .. }))
            .count();
        let closes = lines
            .iter()
            .filter(|l| classify(l).kind == LineKind::BlockClose)
            .count();
        prop_assert_eq!(opens, closes);
        prop_assert_eq!(parsed.tree.operator_count(), opens);
        prop_assert_eq!(parsed.operators.total_occurrences(), opens);
        prop_assert_eq!(parsed.tree.instance_count(), parsed.instances.total_occurrences());
        prop_assert_eq!(parsed.tree.walk().count(), parsed.tree.len());
    }

    #[test]
    fn instance_paths_match_tree(events in prop::collection::vec(arb_event(), 0..60)) {
        let parsed = parse_lines(render(&events)).unwrap();
        let tree = &parsed.tree;

        // occurrences of each variant, in source order
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (_, id) in tree.walk() {
            let node = &tree[id];
            if node.category != NodeCategory::Instance {
                continue;
            }
            let entry = parsed
                .instances
                .get(node.kind.as_deref().unwrap(), &node.raw_params)
                .unwrap();
            prop_assert_eq!(&entry.variant_id, &node.display_name);
            let nth = seen.entry(node.display_name.clone()).or_default();
            prop_assert_eq!(&entry.paths[*nth], &tree.path_of(id));
            *nth += 1;
        }
        for entry in parsed.instances.iter() {
            prop_assert_eq!(seen.get(&entry.variant_id).copied(), Some(entry.count));
        }
    }

    #[test]
    fn indices_follow_first_seen_order(
        calls in prop::collection::vec((0..PRIMITIVES.len(), 0..PARAMS.len()), 1..40),
    ) {
        let mut reg = VariantRegistry::instances();
        let mut expected: HashMap<(usize, usize), String> = HashMap::new();
        let mut per_name: HashMap<usize, usize> = HashMap::new();
        let mut counts: HashMap<(usize, usize), usize> = HashMap::new();

        for &(n, p) in &calls {
            let id = reg.resolve(PRIMITIVES[n], PARAMS[p], &[]);
            let want = expected.entry((n, p)).or_insert_with(|| {
                let next = per_name.entry(n).or_default();
                *next += 1;
                format!("{}{}", PRIMITIVES[n], *next - 1)
            });
            prop_assert_eq!(&id, &*want);

            let count = counts.entry((n, p)).or_default();
            *count += 1;
            prop_assert_eq!(reg.get(PRIMITIVES[n], PARAMS[p]).unwrap().count, *count);
        }
    }

    #[test]
    fn stray_close_is_rejected(
        events in prop::collection::vec(arb_event(), 0..40),
        tail in prop::collection::vec(arb_event(), 0..10),
    ) {
        let mut lines = render(&events);
        lines.push("}".to_string());
        let stray = lines.len();
        lines.extend(render(&tail));

        let result = parse_lines(&lines);
        prop_assert!(
            matches!(result, Err(CsgError::UnbalancedClose { line }) if line == stray),
            "got {:?}",
            result.map(|p| p.tree.len())
        );
    }
}
