//! Pipeline compilation for Conveyor.
//!
//! Turns raw configuration text into an execution-ready
//! [`CompiledPipeline`](conveyor_core::pipeline::CompiledPipeline):
//! parse, validate, then expand every template reference into inlined steps.
//! Each phase fails independently and compilation stops at the first failure.

pub mod compile;
pub mod error;
pub mod expand;
pub mod parse;
pub mod template;
pub mod validate;

pub use compile::Compiler;
pub use error::{CompileError, CompilerError, RefScope};
