//! Tplgen - Template Registry Generator
//!
//! A build-time code generator for families of parametrized algorithms.
//! Given algorithm trees whose template parameters may be filled by several
//! alternatives, it enumerates every concrete instantiation, emits one
//! registration unit per instantiation plus a root unit, and optionally
//! merges the units into a bounded number of compilation groups.
//!
//! # Features
//!
//! - **Cartesian expansion**: every combination of slot alternatives, recursively
//! - **Content-addressed names**: identifiers hashed from the type expression
//! - **Idempotent output**: unchanged files are never rewritten
//! - **Group balancing**: hierarchy-aware greedy splitting into at most `G` units
//!
//! # Example
//!
//! ```rust
//! use tplgen::{expand, AlgorithmSpec};
//!
//! let a = AlgorithmSpec::leaf("A", "a.h");
//! let b = AlgorithmSpec::leaf("B", "b.h").with_slot([a]);
//!
//! let instances = expand(&b).unwrap();
//! assert_eq!(instances[0].type_expression, "B<A>");
//! assert_eq!(instances[0].headers, vec!["a.h", "b.h"]);
//! assert!(instances[0].identifier.ends_with("_B_A_"));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  registry.toml  │  Algorithm definitions + feature probe
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │  Kind trees     │  AlgorithmSpec with dependency slots
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │  Expansion      │  Instance per slot combination
//! └────────┬────────┘
//!     ┌────┴─────┐
//!     ▼          ▼
//! ┌───────┐  ┌──────────┐
//! │ Units │  │ Balancer │  merged compilation groups
//! └───┬───┘  └────┬─────┘
//!     └─────┬─────┘
//!           ▼
//! ┌─────────────────────┐
//! │ Idempotent writer   │  + `;`-joined dependency list
//! └─────────────────────┘
//! ```

#![warn(clippy::all)]

pub mod codegen;
pub mod config;
pub mod expand;
pub mod group;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod probe;
pub mod writer;

// Re-export commonly used types
pub use codegen::{CodegenError, EmitterConfig, KindCalls, TemplateRenderer, UnitRenderer};
pub use config::{ConfigError, RegistryConfig};
pub use expand::{expand, expand_all, expand_kind, ExpandError, Instance};
pub use group::{partition, CompilationGroup, GroupingOptions, Partition};
pub use model::{AlgorithmSpec, Kind};
pub use pipeline::{
    generate, GenerateError, GenerateOptions, GeneratedUnit, GenerationReport, KindOutput,
};
pub use probe::{FeatureProbe, HeaderProbe, ProbeError, StaticProbe};
pub use writer::{IdempotentWriter, WriteError, WriteOutcome, WriteStats, WriterConfig};
