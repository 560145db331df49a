use lyra_debug::stack::{build_stack_trace, StackFrame};
use lyra_host::{MockContext, MockNode, NodeRef};

#[test]
fn the_walk_starts_at_the_parent_of_the_suspended_node() {
    // The suspended node is itself a scope; it still must not become a frame.
    let root = MockNode::scope(1, 0, None);
    let suspended = MockNode::scope(2, 2, Some(root));

    let frames = build_stack_trace(None, &suspended);
    assert_eq!(
        frames,
        vec![StackFrame {
            index: 0,
            name: String::new(),
            line: 1,
            column: 0,
        }]
    );
}

#[test]
fn non_scope_ancestors_are_skipped_without_consuming_indices() {
    let root = MockNode::scope(1, 0, None);
    let stmt = MockNode::expression(2, 0, Some(root));
    let call = MockNode::expression(2, 6, Some(stmt));
    let suspended = MockNode::expression(2, 10, Some(call));

    let frames = build_stack_trace(None, &suspended);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].index, 0);
    assert_eq!(frames[0].line, 1);
}

#[test]
fn frames_are_ordered_innermost_first() {
    let body = MockNode::scope(1, 0, None);
    let outer = MockNode::function("outer", 2, 0, Some(body));
    let inner = MockNode::function("inner", 4, 4, Some(outer));
    let suspended = MockNode::expression(5, 8, Some(inner));

    let context = MockContext::new(3);
    let frames = build_stack_trace(Some(&context), &suspended);
    let names: Vec<&str> = frames.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["inner", "outer", ""]);
    let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn anonymous_scopes_get_empty_names() {
    let block = MockNode::scope(7, 2, None);
    let suspended = MockNode::expression(8, 4, Some(block));

    let frames = build_stack_trace(None, &suspended);
    assert_eq!(frames[0].name, "");
    assert_eq!(frames[0].line, 7);
    assert_eq!(frames[0].column, 2);
}

#[test]
fn the_walk_is_a_pure_function_of_the_chain() {
    let body = MockNode::scope(1, 0, None);
    let func = MockNode::function("tick", 3, 4, Some(body));
    let suspended = MockNode::expression(4, 8, Some(func));

    let first = build_stack_trace(None, &suspended);
    let second = build_stack_trace(None, &suspended);
    assert_eq!(first, second);
}

#[test]
fn deep_chains_are_walked_iteratively() {
    // Alternate scope and expression nodes down a chain far deeper than any
    // recursive walk could survive.
    let mut expected_scopes = 1usize;
    let mut node: NodeRef = MockNode::scope(1, 0, None);
    for line in 2..=10_000i64 {
        node = if line % 2 == 0 {
            MockNode::expression(line, 0, Some(node))
        } else {
            expected_scopes += 1;
            MockNode::scope(line, 0, Some(node))
        };
    }
    let suspended = MockNode::expression(10_001, 0, Some(node));

    let frames = build_stack_trace(None, &suspended);
    assert_eq!(frames.len(), expected_scopes);
    assert_eq!(frames.last().map(|f| f.line), Some(1));
}
