//! Script-hosting engine façade for the Lyra debug service.
//!
//! `lyra-debug` consumes this crate to talk to the engine that actually runs
//! hosted scripts: execute a buffer of script text, resolve modules by their
//! opaque numeric key, and rendezvous with the interpreter through its debug
//! command queue.
//!
//! The traits are deliberately small and object-safe. A production host
//! embeds the real interpreter behind them; tests use the deterministic
//! in-memory doubles ([`MockScriptHost`], [`MockModule`], [`MockNode`]).

mod args;
mod mock;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

pub use args::{Args, KwArgs};
pub use mock::{MockContext, MockModule, MockNode, MockScriptHost};

/// Opaque key identifying a loaded module inside the host's module registry.
pub type ModuleKey = u64;

/// Opaque identifier of a live execution context, used for diagnostics only.
pub type ContextId = u64;

pub type NodeRef = Arc<dyn AstNode>;
pub type ContextRef = Arc<dyn ExecutionContext>;
pub type ModuleRef = Arc<dyn ScriptModule>;
pub type PackageRef = Arc<dyn HostPackage>;

/// Debug action requested against a running module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Step,
    StackTrace,
    Continue,
    StepIn,
    StepOut,
}

/// What the engine reports once it has serviced a debug command.
///
/// Both slots stay `None` until the interpreter reaches a safe point. A
/// serviced command with a `None` `expression` means "no suspended expression
/// available" and is not an error.
#[derive(Clone, Default)]
pub struct CommandOutcome {
    /// The expression the interpreter is suspended at.
    pub expression: Option<NodeRef>,
    /// The execution context active at the suspension point.
    pub context: Option<ContextRef>,
}

impl fmt::Debug for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOutcome")
            .field("expression", &self.expression.is_some())
            .field("context", &self.context.as_ref().map(|c| c.id()))
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("script execution failed: {0}")]
    Script(String),
    #[error("unknown package function `{0}`")]
    UnknownFunction(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("engine did not reach a safe point within {0:?}")]
    Timeout(Duration),
    #[error("module was unloaded while a command was pending")]
    ModuleUnloaded,
}

/// AST node capability surface, just enough to label a stack frame.
///
/// Scope detection and function naming are capability queries rather than
/// concrete node types, so the debug layer never downcasts engine internals.
pub trait AstNode: Send + Sync {
    /// Lexical parent, `None` at the program root.
    fn parent(&self) -> Option<NodeRef>;

    /// Whether this node opens a lexical/function scope.
    fn is_scope(&self) -> bool;

    /// Display name when the node is a named function scope.
    fn function_name(&self) -> Option<String>;

    /// 1-based source line the node starts on.
    fn start_line(&self) -> i64;

    /// Character offset within the start line.
    fn char_pos(&self) -> i64;
}

/// The execution context active when a command was serviced. Opaque to the
/// debug layer; the id only shows up in trace output.
pub trait ExecutionContext: Send + Sync {
    fn id(&self) -> ContextId;
}

/// A loaded, independently addressable unit of hosted script code.
pub trait ScriptModule: Send + Sync {
    /// 1-based line of the module's first statement.
    fn start_line(&self) -> i64;

    /// Submit a debug command and block until the interpreter services it.
    ///
    /// This is the rendezvous between an out-of-process debug request and the
    /// single-threaded execution engine: the call returns once the
    /// interpreter reaches a safe point and fills in the outcome. The wait
    /// is bounded; if the engine does not get there within `wait`, the call
    /// returns [`CommandError::Timeout`] instead of blocking forever.
    fn submit_command(&self, kind: CommandKind, wait: Duration)
        -> Result<CommandOutcome, CommandError>;
}

/// A named bundle of host-callable functions addressable from hosted scripts.
pub trait HostPackage: Send + Sync {
    fn invoke(&self, func: &str, args: &Args, kwargs: &KwArgs) -> Result<Value, HostError>;
}

/// The script hosting engine.
///
/// Handed to the debug service at construction. There is intentionally no
/// process-global accessor: anything that needs the engine holds a
/// `ModuleRef`-producing handle, and tests supply a fake.
pub trait ScriptHost: Send + Sync {
    /// Compile and run `source` as the module named `module_name`, returning
    /// the script's value.
    fn run(&self, module_name: &str, source: &[u8]) -> Result<Value, HostError>;

    /// Resolve a module key against the registry.
    fn query_module(&self, key: ModuleKey) -> Option<ModuleRef>;

    /// Register `package` under `name`, making its functions callable from
    /// arbitrary hosted scripts.
    fn register_package(&self, name: &str, package: PackageRef);
}
