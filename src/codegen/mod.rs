//! Unit Emitters
//!
//! Renders the text of generated compilation units. Rendering is pure: it
//! receives identifiers, headers and ordering computed upstream and never
//! alters them.
//!
//! Templates use named placeholders bound to typed, serializable values, so
//! generated content can never be mistaken for a placeholder token.
//!
//! # Units
//!
//! - **Instance unit**: includes every header of one instantiation and
//!   defines `register_<identifier>`, which registers the concrete type.
//! - **Root unit**: per kind, declares all instance registration functions,
//!   defines `register_<kind>s` calling them in order, and a registry value
//!   built from it under the kind's lowercase name.

mod templates;

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expand::Instance;

/// Errors that can occur while rendering units
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("invalid template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Result type for rendering
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Settings for the emitted source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Header declaring the registry template
    #[serde(default = "default_registry_header")]
    pub registry_header: String,

    /// Prefix joined to every algorithm header in an include
    #[serde(default = "default_include_prefix")]
    pub include_prefix: String,

    /// Namespace wrapping generated code
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Namespace imported inside the generated namespace
    #[serde(default = "default_using_namespace")]
    pub using_namespace: String,

    /// File extension of generated units
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_registry_header() -> String {
    "tudocomp_driver/Registry.hpp".to_string()
}

fn default_include_prefix() -> String {
    "tudocomp/".to_string()
}

fn default_namespace() -> String {
    "tdc_algorithms".to_string()
}

fn default_using_namespace() -> String {
    "tdc".to_string()
}

fn default_extension() -> String {
    "cpp".to_string()
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            registry_header: default_registry_header(),
            include_prefix: default_include_prefix(),
            namespace: default_namespace(),
            using_namespace: default_using_namespace(),
            extension: default_extension(),
        }
    }
}

/// Registration calls of one kind, in emission order.
#[derive(Debug, Clone)]
pub struct KindCalls<'a> {
    pub kind: &'a str,
    pub identifiers: Vec<&'a str>,
}

/// Renders generated units from already computed data.
pub trait UnitRenderer {
    /// File extension of rendered units
    fn extension(&self) -> &str;

    /// Text of the unit registering a single instantiation
    fn render_instance(&self, kind: &str, instance: &Instance) -> CodegenResult<String>;

    /// Text of the root unit referencing every kind's registration function
    fn render_root(&self, kinds: &[KindCalls<'_>]) -> CodegenResult<String>;
}

#[derive(Serialize)]
struct Prelude<'a> {
    registry_header: &'a str,
    namespace: &'a str,
    using_namespace: &'a str,
}

#[derive(Serialize)]
struct InstanceData<'a> {
    #[serde(flatten)]
    prelude: Prelude<'a>,
    includes: Vec<String>,
    kind: &'a str,
    identifier: &'a str,
    type_expression: &'a str,
}

#[derive(Serialize)]
struct RootKind<'a> {
    name: &'a str,
    ident: String,
    constant: String,
    calls: &'a [&'a str],
}

#[derive(Serialize)]
struct RootData<'a> {
    #[serde(flatten)]
    prelude: Prelude<'a>,
    kinds: Vec<RootKind<'a>>,
}

/// Handlebars-backed renderer for C++ registration units.
pub struct TemplateRenderer {
    config: EmitterConfig,
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new(config: EmitterConfig) -> CodegenResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(templates::INSTANCE, templates::INSTANCE_UNIT)?;
        registry.register_template_string(templates::ROOT, templates::ROOT_UNIT)?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn prelude(&self) -> Prelude<'_> {
        Prelude {
            registry_header: &self.config.registry_header,
            namespace: &self.config.namespace,
            using_namespace: &self.config.using_namespace,
        }
    }
}

impl UnitRenderer for TemplateRenderer {
    fn extension(&self) -> &str {
        &self.config.extension
    }

    fn render_instance(&self, kind: &str, instance: &Instance) -> CodegenResult<String> {
        let data = InstanceData {
            prelude: self.prelude(),
            includes: instance
                .headers
                .iter()
                .map(|h| format!("{}{}", self.config.include_prefix, h))
                .collect(),
            kind,
            identifier: &instance.identifier,
            type_expression: &instance.type_expression,
        };
        Ok(self.registry.render(templates::INSTANCE, &data)?)
    }

    fn render_root(&self, kinds: &[KindCalls<'_>]) -> CodegenResult<String> {
        let data = RootData {
            prelude: self.prelude(),
            kinds: kinds
                .iter()
                .map(|k| RootKind {
                    name: k.kind,
                    ident: k.kind.to_lowercase(),
                    constant: k.kind.to_uppercase(),
                    calls: &k.identifiers,
                })
                .collect(),
        };
        Ok(self.registry.render(templates::ROOT, &data)?)
    }
}
