//! Registry and host construction.

use std::collections::HashMap;

use crate::error::SetupError;
use crate::host::{Component, DispatchHost, HostConfig};
use crate::registry::ComponentRegistry;
use crate::scanner::is_component_name;

/// Components to register, built into a matching registry and host.
///
/// Each component is registered under its schema's type name or an explicit
/// name. The first component registered under a name wins; later ones are
/// dropped.
///
/// # Example
///
/// ```
/// use mdcomp_components::{ComponentSchema, ComponentSet, HostConfig, TemplateComponent};
///
/// let alert = TemplateComponent::compile(
///     ComponentSchema::new("Alert"),
///     "<div class=\"alert\"></div>",
/// )
/// .unwrap();
///
/// let (registry, _host) = ComponentSet::new()
///     .with(alert.clone())
///     .with_name("Callout", alert)
///     .build(HostConfig::default())
///     .unwrap();
///
/// assert!(registry.is_registered("Alert"));
/// assert!(registry.is_registered("Callout"));
/// ```
#[derive(Default)]
pub struct ComponentSet {
    entries: Vec<(String, Box<dyn Component>)>,
}

impl ComponentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component under its schema's type name.
    #[must_use]
    pub fn with<C: Component + 'static>(self, component: C) -> Self {
        let name = component.schema().type_name().to_owned();
        self.with_name(name, component)
    }

    /// Add a component under an explicit tag name.
    #[must_use]
    pub fn with_name<C: Component + 'static>(mut self, name: impl Into<String>, component: C) -> Self {
        self.entries.push((name.into(), Box::new(component)));
        self
    }

    /// Number of components added (before duplicate names are dropped).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every schema, register the components and start the host.
    pub fn build(self, config: HostConfig) -> Result<(ComponentRegistry, DispatchHost), SetupError> {
        let mut registry = ComponentRegistry::new();
        let mut hosted: HashMap<String, Box<dyn Component>> = HashMap::new();

        for (name, component) in self.entries {
            if !is_component_name(&name) {
                return Err(SetupError::InvalidName(name));
            }
            component.schema().validate()?;
            if registry.register(name.clone(), component.schema().clone()) {
                hosted.insert(name, component);
            }
        }

        tracing::debug!(components = registry.len(), "Built component registry");
        let host = DispatchHost::spawn(hosted, config)?;
        Ok((registry, host))
    }
}
