//! Remote debug service for the Lyra scripting engine.
//!
//! A process embedding the engine constructs a [`Debugger`] and calls
//! `start()`; external debugger front ends (IDE, CLI) then connect over a
//! loopback byte channel and drive the interpreter by sending script text.
//! Structured debug commands — stepping, call-stack snapshots — travel
//! through the engine itself: the received script calls into the `ldb`
//! package this crate registers with the host, which routes to the
//! [`DebugService`] dispatcher.
//!
//! The hosting engine is a collaborator reached only through the
//! `lyra-host` traits; nothing in here assumes a concrete interpreter, so
//! the whole surface is testable against the in-memory mock host.

pub mod config;
pub mod debugger;
pub mod error;
pub mod service;
pub mod session;
pub mod stack;
pub mod trace;

pub use config::DebugConfig;
pub use debugger::Debugger;
pub use error::{DebugError, DebugResult};
pub use service::{DebugService, PENDING_RESULT, SERVICE_PACKAGE};
pub use session::{DEBUGGER_MODULE, FAILED_ACK, OK_ACK_PREFIX};
pub use stack::{build_stack_trace, StackFrame};
pub use trace::init_tracing;
