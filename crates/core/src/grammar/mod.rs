/// Tailoring directive types handed to a sink.
pub mod directive;
/// JSON serialization helpers for recorded directives.
pub mod dump;
mod literal;
/// Rule parser: top-level driver and reset/relation chains.
pub mod parser;
pub(crate) mod scanner;
mod setting;
