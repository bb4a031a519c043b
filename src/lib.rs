//! Jsonnet Library Generator
//!
//! Compiles an OpenAPI-style schema document into a Jsonnet library of
//! constructors, `with*` setters and nested `mixin` namespaces, one object
//! per schema definition.
//!
//! ## Features
//!
//! - **Deterministic output**: groups, versions, objects and properties are
//!   emitted in sorted order, so repeated runs are byte-identical
//! - **Mixin expansion**: references between definitions are flattened into
//!   nested namespaces (`deployment.mixin.spec.template.spec.withContainers`)
//! - **Customization tables**: per-release constructors, blacklists and
//!   identifier rewrites
//! - **Two-tier errors**: structural problems abort, unresolved references
//!   degrade with a diagnostic
//!
//! ## Architecture
//!
//! ```text
//! SchemaDocument ──importer──▶ Root (model tree) ──Emitter──▶ library text
//!                                 │
//!                                 ├── groups / versions / objects (visible)
//!                                 └── hidden groups (reference-only types)
//! ```
//!
//! ## Output shape
//!
//! ```text
//! {
//!   core:: {
//!     v1:: {
//!       local apiVersion = {apiVersion: "v1"},
//!       pod:: {
//!         local kind = {kind: "Pod"},
//!         new():: apiVersion + kind,
//!         mixin:: { spec:: { ... }, ... },
//!       },
//!     },
//!   },
//!   local hidden = { core:: { v1:: { podSpec:: { ... } } } },
//! }
//! ```

pub mod checksum;
pub mod config;
pub mod customize;
pub mod diagnostics;
pub mod drift;
pub mod emit;
pub mod error;
pub mod model;
pub mod naming;
pub mod schema;

pub use checksum::Checksum;
pub use config::GenConfig;
pub use customize::{ConstructorSpec, CustomizationTable, Customizations, ParamSpec};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use drift::{detect_drift, DriftReport};
pub use emit::{emit_library, generate_library, GeneratedOutput, GenerationStats};
pub use error::{GenError, Result};
pub use model::{build_model, Provenance, Root};
pub use naming::{JsonnetNaming, NamingPolicy};
pub use schema::{DefinitionName, SchemaDocument};
