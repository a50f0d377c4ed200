//! Template components built from configuration.

use mdcomp_components::{
    ComponentRegistry, ComponentSchema, ComponentSet, ParamSpec, ParamType, TemplateComponent,
};
use mdcomp_config::{ComponentConfig, Config, ParamConfig, ParamTypeName};

use crate::error::CliError;

fn param_spec(name: &str, param: ParamConfig) -> ParamSpec {
    let spec = match param.param_type() {
        ParamTypeName::String => ParamSpec::value(name, ParamType::String),
        ParamTypeName::Integer => ParamSpec::value(name, ParamType::Integer),
        ParamTypeName::Boolean => ParamSpec::value(name, ParamType::Boolean),
        ParamTypeName::Float => ParamSpec::value(name, ParamType::Float),
        ParamTypeName::DefaultSlot => ParamSpec::default_slot(name),
        ParamTypeName::NamedSlot => ParamSpec::named_slot(name),
    };
    if param.required() { spec.required() } else { spec }
}

/// Schema declared by a configured component.
pub(crate) fn schema(type_name: &str, component: &ComponentConfig) -> ComponentSchema {
    component
        .params
        .iter()
        .fold(ComponentSchema::new(type_name), |schema, (name, param)| {
            schema.with_param(param_spec(name, *param))
        })
}

/// Tag names of a component: its own name followed by its aliases.
fn tag_names<'a>(name: &'a str, component: &'a ComponentConfig) -> impl Iterator<Item = &'a str> {
    std::iter::once(name).chain(component.aliases.iter().map(String::as_str))
}

/// Compile every configured template and collect the components.
pub(crate) fn component_set(config: &Config) -> Result<ComponentSet, CliError> {
    let mut set = ComponentSet::new();
    for (name, component) in &config.components {
        let template = component.read_template()?;
        let compiled = TemplateComponent::compile(schema(name, component), &template)?;
        tracing::debug!(component = %name, aliases = component.aliases.len(), "Compiled template");
        for tag in tag_names(name, component) {
            set = set.with_name(tag, compiled.clone());
        }
    }
    Ok(set)
}

/// Registry of configured tags, without compiling templates or starting a host.
pub(crate) fn registry(config: &Config) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for (name, component) in &config.components {
        let schema = schema(name, component);
        for tag in tag_names(name, component) {
            registry.register(tag, schema.clone());
        }
    }
    registry
}
