//! Error types for library generation
//!
//! Every variant here is fatal: the run aborts and no output is produced.
//! Recoverable problems are collected as [`crate::diagnostics::Diagnostics`].

use thiserror::Error;

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenError>;

/// Generation errors
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Duplicate kind '{kind}' in {group}/{version} (definition {path})")]
    DuplicateKind {
        group: String,
        version: String,
        kind: String,
        path: String,
    },

    #[error("Kind '{kind}' in {group}/{version} renders as identifier '{identifier}', which collides with kind '{existing}'")]
    KindIdentifierCollision {
        group: String,
        version: String,
        kind: String,
        identifier: String,
        existing: String,
    },

    #[error("Properties '{property}' and '{existing}' of {path} both rewrite to identifier '{identifier}'")]
    PropertyIdentifierCollision {
        path: String,
        property: String,
        existing: String,
        identifier: String,
    },

    #[error("Mixin '{identifier}' on {path} collides with kind '{identifier}' in {group}/{version}")]
    MixinKindCollision {
        path: String,
        identifier: String,
        group: String,
        version: String,
    },

    #[error("Can't create type alias '{alias}' on {path}: a property with that name already exists")]
    TypeAliasCollision { path: String, alias: String },

    #[error("Property '{property}' of {path} has neither a type nor a $ref")]
    MalformedProperty { path: String, property: String },

    #[error("Constructor '{constructor}' of {path} names parameter '{param}', but no such property exists")]
    UnknownConstructorProperty {
        path: String,
        constructor: String,
        param: String,
    },

    #[error("Constructor '{constructor}' of {path} targets '{target}', which does not resolve: {reason}")]
    InvalidConstructorPath {
        path: String,
        constructor: String,
        target: String,
        reason: String,
    },

    #[error("Constructor '{constructor}' of {path} has the same name as a property")]
    ConstructorShadowsProperty { path: String, constructor: String },

    #[error("Constructor '{constructor}' is declared twice for {path}")]
    DuplicateConstructor { path: String, constructor: String },

    #[error("Invalid schema document: {0}")]
    InvalidSchema(String),

    #[error("Invalid customization file {path}: {reason}")]
    InvalidCustomization { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
