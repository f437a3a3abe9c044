//! # MA Plan Validator PDDL
//!
//! Parsing of the multi-agent PDDL dialect (one implicit `:agent` parameter
//! per action) into a typed model, and serialization of that model back into
//! classical single-agent PDDL.

pub mod domain_parser;
pub mod group;
pub mod literal;
pub mod model;
pub mod problem_parser;
pub mod reader;
pub mod serializer;
pub mod task;
pub mod tokenizer;
pub mod types;
pub mod writer;

#[cfg(test)]
mod fixtures;

// Re-exports
pub use domain_parser::{DomainBuilder, DomainParser};
pub use model::*;
pub use problem_parser::ProblemParser;
pub use reader::{ClassicalReader, PddlReader};
pub use serializer::ClassicalSerializer;
pub use task::{Capabilities, ParseOptions, PlanningTask};
pub use tokenizer::tokenize;
pub use types::{ObjectTable, TypeHierarchy, ROOT_TYPE};
pub use writer::{ActionSchema, AgentSpec, MultiAgentProblem, MultiAgentWriter, RenderedText, UnfactoredWriter};
