use lyra_host::{ContextRef, NodeRef};
use serde::Serialize;

/// One entry of a reconstructed call stack.
///
/// Value object, built fresh per request and never mutated; `index` counts
/// from the innermost enclosing scope outward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    pub index: usize,
    /// Enclosing function name; empty when the scope is not a named function.
    pub name: String,
    /// 1-based start line of the scope-owning node.
    pub line: i64,
    /// Character offset within that line.
    pub column: i64,
}

/// Reconstruct the call stack enclosing `suspended`.
///
/// Walks the parent chain starting at the suspended expression's immediate
/// parent: every scope node on the way up becomes one frame, non-scope nodes
/// are skipped without consuming an index, and the walk stops at the program
/// root. The suspended expression itself never contributes a frame.
///
/// The walk is iterative — chains can be as deep as the host's AST without
/// growing this stack — and read-only: the same chain always yields the same
/// frame sequence.
pub fn build_stack_trace(context: Option<&ContextRef>, suspended: &NodeRef) -> Vec<StackFrame> {
    let mut frames = Vec::new();
    let mut cursor = suspended.parent();
    while let Some(node) = cursor {
        if node.is_scope() {
            frames.push(StackFrame {
                index: frames.len(),
                name: node.function_name().unwrap_or_default(),
                line: node.start_line(),
                column: node.char_pos(),
            });
        }
        cursor = node.parent();
    }
    tracing::trace!(
        context = ?context.map(|c| c.id()),
        frames = frames.len(),
        "reconstructed call stack"
    );
    frames
}
