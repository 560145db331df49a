use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    AstNode, CommandError, CommandKind, CommandOutcome, ContextId, ContextRef, ExecutionContext,
    HostError, ModuleKey, ModuleRef, NodeRef, PackageRef, ScriptHost, ScriptModule,
};

type RunHandler = dyn Fn(&str, &[u8]) -> Result<Value, HostError> + Send + Sync;

/// Deterministic, in-memory script host test double.
#[derive(Default)]
pub struct MockScriptHost {
    state: Mutex<HostState>,
}

#[derive(Default)]
struct HostState {
    modules: HashMap<ModuleKey, ModuleRef>,
    packages: HashMap<String, PackageRef>,
    run_results: VecDeque<Result<Value, HostError>>,
    run_calls: Vec<(String, Vec<u8>)>,
    run_handler: Option<Arc<RunHandler>>,
    queries: Vec<ModuleKey>,
}

impl MockScriptHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_module(&self, key: ModuleKey, module: ModuleRef) {
        self.state.lock().modules.insert(key, module);
    }

    /// Queue the result of the next `run` call.
    pub fn push_run_result(&self, result: Result<Value, HostError>) {
        self.state.lock().run_results.push_back(result);
    }

    /// Route every `run` call through `handler` instead of the queued
    /// results. Useful for tests that want the host to behave like a real
    /// interpreter dispatching into registered packages.
    pub fn set_run_handler(
        &self,
        handler: impl Fn(&str, &[u8]) -> Result<Value, HostError> + Send + Sync + 'static,
    ) {
        self.state.lock().run_handler = Some(Arc::new(handler));
    }

    /// Every `run` invocation observed so far, as `(module name, source)`.
    pub fn run_calls(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().run_calls.clone()
    }

    /// Every module key passed to `query_module` so far.
    pub fn queried_modules(&self) -> Vec<ModuleKey> {
        self.state.lock().queries.clone()
    }

    pub fn registered_packages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().packages.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn package(&self, name: &str) -> Option<PackageRef> {
        self.state.lock().packages.get(name).cloned()
    }
}

impl ScriptHost for MockScriptHost {
    fn run(&self, module_name: &str, source: &[u8]) -> Result<Value, HostError> {
        let handler = {
            let mut state = self.state.lock();
            state.run_calls.push((module_name.to_string(), source.to_vec()));
            state.run_handler.clone()
        };
        if let Some(handler) = handler {
            return handler(module_name, source);
        }
        match self.state.lock().run_results.pop_front() {
            Some(result) => result,
            None => Err(HostError::Script(format!(
                "no mock run result queued for module `{module_name}`"
            ))),
        }
    }

    fn query_module(&self, key: ModuleKey) -> Option<ModuleRef> {
        let mut state = self.state.lock();
        state.queries.push(key);
        state.modules.get(&key).cloned()
    }

    fn register_package(&self, name: &str, package: PackageRef) {
        self.state.lock().packages.insert(name.to_string(), package);
    }
}

/// Script module double with queued command outcomes.
pub struct MockModule {
    start_line: i64,
    state: Mutex<ModuleState>,
}

#[derive(Default)]
struct ModuleState {
    outcomes: VecDeque<Result<CommandOutcome, CommandError>>,
    submitted: Vec<(CommandKind, Duration)>,
}

impl MockModule {
    pub fn new(start_line: i64) -> Arc<Self> {
        Arc::new(Self {
            start_line,
            state: Mutex::default(),
        })
    }

    pub fn push_outcome(&self, outcome: Result<CommandOutcome, CommandError>) {
        self.state.lock().outcomes.push_back(outcome);
    }

    /// Queue a serviced command suspended at `expression`.
    pub fn push_suspended(&self, expression: NodeRef, context: ContextRef) {
        self.push_outcome(Ok(CommandOutcome {
            expression: Some(expression),
            context: Some(context),
        }));
    }

    /// Every command submitted so far, as `(kind, wait budget)`.
    pub fn submitted(&self) -> Vec<(CommandKind, Duration)> {
        self.state.lock().submitted.clone()
    }
}

impl ScriptModule for MockModule {
    fn start_line(&self) -> i64 {
        self.start_line
    }

    fn submit_command(
        &self,
        kind: CommandKind,
        wait: Duration,
    ) -> Result<CommandOutcome, CommandError> {
        let mut state = self.state.lock();
        state.submitted.push((kind, wait));
        // An empty queue models a serviced command with nothing suspended.
        state
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(CommandOutcome::default()))
    }
}

/// AST node double for building parent-pointer chains by hand.
pub struct MockNode {
    parent: Option<NodeRef>,
    scope: bool,
    function: Option<String>,
    line: i64,
    column: i64,
}

impl MockNode {
    /// Plain (non-scope) expression node.
    pub fn expression(line: i64, column: i64, parent: Option<NodeRef>) -> NodeRef {
        Arc::new(Self {
            parent,
            scope: false,
            function: None,
            line,
            column,
        })
    }

    /// Anonymous scope node (block, module body).
    pub fn scope(line: i64, column: i64, parent: Option<NodeRef>) -> NodeRef {
        Arc::new(Self {
            parent,
            scope: true,
            function: None,
            line,
            column,
        })
    }

    /// Named function scope node.
    pub fn function(
        name: impl Into<String>,
        line: i64,
        column: i64,
        parent: Option<NodeRef>,
    ) -> NodeRef {
        Arc::new(Self {
            parent,
            scope: true,
            function: Some(name.into()),
            line,
            column,
        })
    }
}

impl AstNode for MockNode {
    fn parent(&self) -> Option<NodeRef> {
        self.parent.clone()
    }

    fn is_scope(&self) -> bool {
        self.scope
    }

    fn function_name(&self) -> Option<String> {
        self.function.clone()
    }

    fn start_line(&self) -> i64 {
        self.line
    }

    fn char_pos(&self) -> i64 {
        self.column
    }
}

/// Execution context double; only the id is observable.
pub struct MockContext {
    id: ContextId,
}

impl MockContext {
    pub fn new(id: ContextId) -> ContextRef {
        Arc::new(Self { id })
    }
}

impl ExecutionContext for MockContext {
    fn id(&self) -> ContextId {
        self.id
    }
}
