//! Tool catalogs: name-keyed registries and layered lookup.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use sfprovider::ToolDefinition;
//! use sftooling::{FunctionCallback, LayeredToolCatalog, ToolCatalog, ToolRegistry};
//!
//! let definition = |name: &str| ToolDefinition {
//!     name: name.to_string(),
//!     description: String::new(),
//!     input_schema: "{}".to_string(),
//! };
//!
//! let mut shared = ToolRegistry::new();
//! shared.register(FunctionCallback::from_sync(definition("clock"), |_, _| Ok("noon".into())));
//!
//! let catalog = LayeredToolCatalog::new()
//!     .with_layer(Arc::new(ToolRegistry::new()))
//!     .with_layer(Arc::new(shared));
//!
//! assert!(catalog.resolve("clock").is_some());
//! assert!(catalog.resolve("missing").is_none());
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use sfcommon::FunctionTable;

use crate::Tool;

/// Resolves a function name to an invocable handler.
pub trait ToolCatalog: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: FunctionTable<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry where the first tool registered under a name wins.
    pub fn from_tools<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registry = Self::new();
        for tool in tools {
            registry.register_shared_if_absent(tool);
        }
        registry
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.register_shared(Arc::new(tool));
    }

    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    /// Returns `false` when a tool with the same name is already registered.
    pub fn register_shared_if_absent(&mut self, tool: Arc<dyn Tool>) -> bool {
        self.tools.insert_if_absent(tool.name(), tool)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.tools.names()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Debug for ToolRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ToolCatalog for ToolRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.get(name)
    }
}

/// Consults each layer in insertion order and returns the first match.
#[derive(Clone, Default)]
pub struct LayeredToolCatalog {
    layers: Vec<Arc<dyn ToolCatalog>>,
}

impl LayeredToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: Arc<dyn ToolCatalog>) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn push_layer(&mut self, layer: Arc<dyn ToolCatalog>) {
        self.layers.push(layer);
    }
}

impl Debug for LayeredToolCatalog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredToolCatalog")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl ToolCatalog for LayeredToolCatalog {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.layers.iter().find_map(|layer| layer.resolve(name))
    }
}

#[cfg(test)]
mod tests {
    use sfprovider::ToolDefinition;

    use super::*;
    use crate::{FunctionCallback, ToolExecutionContext};

    fn callback(name: &str, output: &'static str) -> Arc<dyn Tool> {
        Arc::new(FunctionCallback::from_sync(
            ToolDefinition {
                name: name.to_string(),
                description: format!("{name} tool"),
                input_schema: "{\"type\":\"object\"}".to_string(),
            },
            move |_, _| Ok(output.to_string()),
        ))
    }

    #[test]
    fn registry_tracks_registered_tools() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register_shared(callback("weather", "sunny"));
        registry.register_shared(callback("clock", "noon"));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("weather"));
        assert_eq!(registry.names(), vec!["clock", "weather"]);

        registry.register_shared(callback("weather", "rainy"));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn from_tools_keeps_the_first_registration() {
        let registry = ToolRegistry::from_tools(vec![
            callback("lookup", "first"),
            callback("lookup", "second"),
        ]);

        assert_eq!(registry.len(), 1);
        let tool = registry.get("lookup").expect("lookup should exist");
        let output = tool
            .invoke("{}", &ToolExecutionContext::new())
            .await
            .expect("invoke");
        assert_eq!(output, "first");
    }

    #[tokio::test]
    async fn layered_catalog_prefers_earlier_layers() {
        let runtime = ToolRegistry::from_tools(vec![callback("lookup", "runtime")]);
        let defaults = ToolRegistry::from_tools(vec![
            callback("lookup", "default"),
            callback("clock", "noon"),
        ]);

        let catalog = LayeredToolCatalog::new()
            .with_layer(Arc::new(runtime))
            .with_layer(Arc::new(defaults));
        assert_eq!(format!("{catalog:?}"), "LayeredToolCatalog { layers: 2 }");

        let context = ToolExecutionContext::new();
        let lookup = catalog.resolve("lookup").expect("lookup should resolve");
        assert_eq!(
            lookup.invoke("{}", &context).await.expect("invoke"),
            "runtime"
        );

        let clock = catalog.resolve("clock").expect("clock should resolve");
        assert_eq!(clock.invoke("{}", &context).await.expect("invoke"), "noon");
        assert!(catalog.resolve("missing").is_none());
    }
}
