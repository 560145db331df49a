use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use lyra_host::{
    Args, CommandError, CommandKind, HostError, HostPackage, KwArgs, ModuleKey, ScriptHost,
};

use crate::stack::build_stack_trace;

/// Well-known package name the debug command surface is registered under.
pub const SERVICE_PACKAGE: &str = "ldb";

/// Script-visible function names of the package.
pub const FN_GET_START_LINE: &str = "get_startline";
pub const FN_COMMAND: &str = "command";

/// Result returned when the engine did not service a command within the
/// configured wait budget.
pub const PENDING_RESULT: &str = "Pending";

/// The debug command dispatcher.
///
/// Registered with the host under [`SERVICE_PACKAGE`]; hosted scripts — and
/// therefore remote debug sessions, via raw script mode — reach it as
/// `ldb.get_startline(...)` / `ldb.command(...)`. The engine handle is
/// injected at construction so the dispatcher can be exercised against a
/// fake host.
pub struct DebugService {
    host: Arc<dyn ScriptHost>,
    command_timeout: Duration,
}

impl DebugService {
    pub fn new(host: Arc<dyn ScriptHost>, command_timeout: Duration) -> Self {
        Self {
            host,
            command_timeout,
        }
    }

    /// 1-based start line of the module named by the first positional
    /// argument.
    ///
    /// Fails soft: a missing or non-numeric argument, or a key that does not
    /// resolve, yields `false` rather than an error — callers check the
    /// result's type, not a thrown error.
    pub fn get_module_start_line(&self, args: &Args) -> Value {
        let Some(key) = args.module_key() else {
            return Value::Bool(false);
        };
        match self.host.query_module(key) {
            Some(module) => Value::from(module.start_line()),
            None => Value::Bool(false),
        }
    }

    /// Route one debug command against the module named by the first
    /// positional argument.
    ///
    /// Command names are matched exactly and in order; the first match wins.
    /// Unrecognized names answer the neutral no-op shape so newer clients
    /// keep working against older services.
    pub fn command(&self, args: &Args, kwargs: &KwArgs) -> Value {
        let Some(key) = args.module_key() else {
            return Value::Bool(false);
        };
        let Some(module) = self.host.query_module(key) else {
            return Value::Bool(false);
        };

        let cmd = kwargs.str_arg("cmd").unwrap_or_default();
        match cmd {
            "Step" => match module.submit_command(CommandKind::Step, self.command_timeout) {
                Ok(outcome) => {
                    let line = outcome.expression.map_or(-1, |expr| expr.start_line());
                    Value::from(line)
                }
                Err(err) => command_error_value(key, cmd, err),
            },
            "Stack" => match module.submit_command(CommandKind::StackTrace, self.command_timeout) {
                Ok(outcome) => match outcome.expression {
                    Some(expression) => {
                        let frames = build_stack_trace(outcome.context.as_ref(), &expression);
                        serde_json::to_value(frames).unwrap_or_default()
                    }
                    None => Value::Null,
                },
                Err(err) => command_error_value(key, cmd, err),
            },
            // Recognized placeholders: accepted without protocol error and
            // without touching module state.
            "Continue" | "StepIn" | "StepOut" => {
                tracing::debug!(module = key, cmd, "debug command not yet supported");
                Value::Null
            }
            _ => {
                tracing::debug!(module = key, cmd, "ignoring unrecognized debug command");
                Value::Null
            }
        }
    }
}

fn command_error_value(key: ModuleKey, cmd: &str, err: CommandError) -> Value {
    match err {
        CommandError::Timeout(wait) => {
            tracing::warn!(module = key, cmd, ?wait, "debug command still pending");
            Value::String(PENDING_RESULT.to_string())
        }
        err => {
            tracing::warn!(module = key, cmd, %err, "debug command failed");
            Value::Bool(false)
        }
    }
}

impl HostPackage for DebugService {
    fn invoke(&self, func: &str, args: &Args, kwargs: &KwArgs) -> Result<Value, HostError> {
        match func {
            FN_GET_START_LINE => Ok(self.get_module_start_line(args)),
            FN_COMMAND => Ok(self.command(args, kwargs)),
            other => Err(HostError::UnknownFunction(other.to_string())),
        }
    }
}
