//! Sort / Aggregate / Prune tests, including the documented scenarios.

use anyhow::Result;
use rstest::{fixture, rstest};
use rstree::util::testing::init_test_setup;
use rstree::{AttrSpec, NodeId, Traversal, Tree, TreeError, Value};

fn sum(values: &[Value]) -> Value {
    Value::from(values.iter().filter_map(Value::as_number).sum::<f64>())
}

/// A
/// ├── B
/// │   ├── D (cost=10)
/// │   └── E (cost=20)
/// └── C (cost=5)
#[fixture]
fn costed() -> (Tree, NodeId, NodeId, NodeId) {
    init_test_setup();
    let mut tree = Tree::new("A");
    let a = tree.root();
    let b = tree.add_child(a, "B").unwrap();
    let c = tree.add_child(a, "C").unwrap();
    let d = tree.add_child(b, "D").unwrap();
    let e = tree.add_child(b, "E").unwrap();
    tree.set_attribute(d, "cost", Value::from(10)).unwrap();
    tree.set_attribute(e, "cost", Value::from(20)).unwrap();
    tree.set_attribute(c, "cost", Value::from(5)).unwrap();
    (tree, a, b, c)
}

#[rstest]
fn given_costed_tree_when_aggregating_then_sums_roll_up(
    costed: (Tree, NodeId, NodeId, NodeId),
) -> Result<()> {
    let (tree, a, b, c) = costed;
    assert_eq!(tree.aggregate(b, "cost", &sum)?, Value::from(30));
    assert_eq!(tree.aggregate(a, "cost", &sum)?, Value::from(35));
    // leaf aggregates to its own value
    assert_eq!(tree.aggregate(c, "cost", &sum)?, Value::from(5));
    Ok(())
}

#[rstest]
fn given_costed_tree_when_aggregating_then_parent_equals_sum_of_children(
    costed: (Tree, NodeId, NodeId, NodeId),
) -> Result<()> {
    let (tree, a, ..) = costed;
    let child_total: f64 = tree
        .children(a)?
        .into_iter()
        .map(|child| tree.aggregate(child, "cost", &sum).unwrap().as_number().unwrap())
        .sum();
    assert_eq!(tree.aggregate(a, "cost", &sum)?, Value::from(child_total));
    Ok(())
}

#[rstest]
fn given_unset_leaf_when_aggregating_then_missing_value_names_the_leaf() -> Result<()> {
    init_test_setup();
    let mut tree = Tree::new("root");
    tree.add_child(tree.root(), "bare")?;

    let err = tree.aggregate(tree.root(), "cost", &sum).unwrap_err();
    match err {
        TreeError::MissingValue { node, attribute } => {
            assert_eq!(node, "bare");
            assert_eq!(attribute, "cost");
        }
        other => panic!("expected MissingValue, got {other:?}"),
    }
    Ok(())
}

#[rstest]
fn given_interior_value_when_aggregating_then_children_win() -> Result<()> {
    init_test_setup();
    // the fold is structural: an interior node's own value is ignored
    let mut tree = Tree::new("root");
    let root = tree.root();
    tree.set_attribute(root, "cost", Value::from(999))?;
    let x = tree.add_child(root, "x")?;
    let y = tree.add_child(root, "y")?;
    tree.set_attribute(x, "cost", Value::from(1))?;
    tree.set_attribute(y, "cost", Value::from(2))?;

    assert_eq!(tree.aggregate(root, "cost", &sum)?, Value::from(3));
    Ok(())
}

#[rstest]
fn given_capturing_reducer_when_resolving_aggregate_spec_then_values_roll_up(
    costed: (Tree, NodeId, NodeId, NodeId),
) -> Result<()> {
    let (tree, a, ..) = costed;
    // reducer borrows local state, so it is not 'static
    let scale = 2.0;
    let scaled_sum = |values: &[Value]| {
        Value::from(values.iter().filter_map(Value::as_number).sum::<f64>() * scale)
    };

    let totals = tree.get(a, &AttrSpec::aggregate("cost", &scaled_sum), Traversal::PreOrder)?;
    // leaves contribute their stored value, every interior level scales
    assert_eq!(
        totals,
        vec![
            Value::from(130), // A: (B=60 + C=5) * 2
            Value::from(60),  // B: (10 + 20) * 2
            Value::from(10),  // D
            Value::from(20),  // E
            Value::from(5),   // C
        ]
    );
    assert_eq!(tree.aggregate(a, "cost", &scaled_sum)?, Value::from(130));
    Ok(())
}

#[rstest]
fn given_costs_when_sorting_decreasing_then_children_reorder_with_subtrees_intact() -> Result<()> {
    init_test_setup();
    // root children carry costs [5, 20, 10]; the 20-child has its own subtree
    let mut tree = Tree::new("root");
    let root = tree.root();
    let p = tree.add_child(root, "p")?;
    let q = tree.add_child(root, "q")?;
    let r = tree.add_child(root, "r")?;
    tree.set_attribute(p, "cost", Value::from(5))?;
    tree.set_attribute(q, "cost", Value::from(20))?;
    tree.set_attribute(r, "cost", Value::from(10))?;
    let q1 = tree.add_child(q, "q1")?;
    let q2 = tree.add_child(q, "q2")?;

    tree.sort(root, &AttrSpec::name("cost"), true)?;

    let costs = tree.get(root, &AttrSpec::name("cost"), Traversal::LevelOrder)?;
    assert_eq!(costs[1..4], [Value::from(20), Value::from(10), Value::from(5)]);
    assert_eq!(tree.children(root)?, vec![q, r, p]);
    // the moved child kept its internal structure
    assert_eq!(tree.children(q)?, vec![q1, q2]);
    Ok(())
}

#[rstest]
fn given_equal_keys_when_sorting_then_order_is_stable() -> Result<()> {
    init_test_setup();
    let mut tree = Tree::new("root");
    let root = tree.root();
    let first = tree.add_child(root, "first")?;
    let second = tree.add_child(root, "second")?;
    let third = tree.add_child(root, "third")?;
    for id in [first, second, third] {
        tree.set_attribute(id, "cost", Value::from(1))?;
    }

    tree.sort(root, &AttrSpec::name("cost"), false)?;
    assert_eq!(tree.children(root)?, vec![first, second, third]);
    tree.sort(root, &AttrSpec::name("cost"), true)?;
    assert_eq!(tree.children(root)?, vec![first, second, third]);
    Ok(())
}

#[rstest]
fn given_whole_subtree_when_sorting_then_descendant_levels_sort_too(
    costed: (Tree, NodeId, NodeId, NodeId),
) -> Result<()> {
    let (mut tree, a, b, _) = costed;
    tree.sort(a, &AttrSpec::aggregate("cost", &sum), true)?;

    // B (30) outranks C (5) at the top, E (20) outranks D (10) below
    let top: Vec<&str> = tree
        .children(a)?
        .into_iter()
        .map(|id| tree.name(id).unwrap())
        .collect();
    assert_eq!(top, vec!["B", "C"]);
    let below: Vec<&str> = tree
        .children(b)?
        .into_iter()
        .map(|id| tree.name(id).unwrap())
        .collect();
    assert_eq!(below, vec!["E", "D"]);
    Ok(())
}

#[rstest]
fn given_predicate_when_pruning_then_matching_subtrees_go_as_units(
    costed: (Tree, NodeId, NodeId, NodeId),
) -> Result<()> {
    let (mut tree, a, ..) = costed;

    // prune everything named B; its children D and E go with it unevaluated
    let named_b = |tree: &Tree, id: NodeId| tree.name(id).unwrap() == "B";
    let pruned = tree.prune(a, &named_b)?;
    assert_eq!(pruned, 1);
    assert_eq!(tree.node_count(a)?, 2);
    assert_eq!(tree.child_named(a, "B")?, None);
    Ok(())
}

#[rstest]
fn given_predicate_matching_start_when_pruning_then_start_survives(
    costed: (Tree, NodeId, NodeId, NodeId),
) -> Result<()> {
    let (mut tree, a, ..) = costed;
    let everything = |_: &Tree, _: NodeId| true;
    let pruned = tree.prune(a, &everything)?;

    // both direct children pruned as units, the start node stays
    assert_eq!(pruned, 2);
    assert_eq!(tree.node_count(a)?, 1);
    assert!(tree.is_leaf(a)?);
    Ok(())
}
