use std::collections::{BTreeMap, HashSet};

use crate::effects::builtin;
use crate::effects::derive::DeriveFn;
use crate::effects::template::Template;
use crate::error::{ConfigError, Result};
use crate::fields::{field_key, FieldSchema, ACTION};

/// Template binding for the located ImageMagick executable
pub const EXECUTABLE_KEY: &str = "convert";

/// One row of the effect table
///
/// The template, the fields it needs and any derived values live together, so
/// an effect can never have a template without a relevance list or the
/// other way around.
#[derive(Debug, Clone)]
pub struct EffectSpec {
    name: String,
    template: Template,
    fields: Vec<String>,
    derive: Option<DeriveFn>,
    derived_keys: Vec<String>,
}

impl EffectSpec {
    /// Create an effect from a template and the labels of the fields it uses
    pub fn new(name: &str, template: &str, fields: &[&str]) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            template: Template::parse(template)?,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            derive: None,
            derived_keys: Vec::new(),
        })
    }

    /// Attach a derived-value step that writes `keys`
    pub fn with_derive(mut self, derive: DeriveFn, keys: &[&str]) -> Self {
        self.derive = Some(derive);
        self.derived_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Labels of the fields this effect reads, without the action selector
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn derive(&self) -> Option<DeriveFn> {
        self.derive
    }

    /// Check that every placeholder is bound by the executable, a field or a derived key
    fn check_placeholders(&self) -> Result<()> {
        let mut bound: HashSet<String> = self.fields.iter().map(|f| field_key(f)).collect();
        bound.extend(self.derived_keys.iter().cloned());
        bound.insert(EXECUTABLE_KEY.to_string());

        if let Some(unbound) = self.template.placeholders().find(|p| !bound.contains(*p)) {
            return Err(ConfigError::InvalidTemplate {
                reason: format!("effect '{}' uses unbound placeholder '{}'", self.name, unbound),
            }
            .into());
        }
        Ok(())
    }
}

/// Immutable table of effects keyed by name
///
/// Built once at startup and shared read-only, typically behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EffectCatalog {
    effects: BTreeMap<String, EffectSpec>,
}

impl EffectCatalog {
    /// Create a catalog with all built-in effects
    pub fn new() -> Result<Self> {
        let mut catalog = Self::empty();
        for spec in builtin::effects()? {
            catalog.register(spec)?;
        }
        Ok(catalog)
    }

    /// Create a catalog without any effects
    pub fn empty() -> Self {
        Self {
            effects: BTreeMap::new(),
        }
    }

    /// Register an effect
    ///
    /// Fails on duplicate names and on templates that reference values the
    /// effect does not provide.
    pub fn register(&mut self, spec: EffectSpec) -> Result<()> {
        if self.effects.contains_key(&spec.name) {
            return Err(ConfigError::DuplicateEffect { name: spec.name }.into());
        }
        spec.check_placeholders()?;
        self.effects.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Look up an effect by name
    pub fn get(&self, name: &str) -> Result<&EffectSpec> {
        self.effects
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEffect { name: name.to_string() }.into())
    }

    /// Field labels to show for `name`, selector first, in declaration order
    pub fn relevant_field_labels(&self, name: &str) -> Result<Vec<String>> {
        let spec = self.get(name)?;
        let mut labels = Vec::with_capacity(spec.fields.len() + 1);
        labels.push(ACTION.to_string());
        labels.extend(spec.fields.iter().cloned());
        Ok(labels)
    }

    /// Check every effect's fields against the schema
    ///
    /// Fields must exist and be listed in schema declaration order.
    pub fn check_fields(&self, schema: &FieldSchema) -> Result<()> {
        for spec in self.effects.values() {
            let mut last = None;
            for label in &spec.fields {
                let position = schema
                    .position(label)
                    .ok_or_else(|| ConfigError::UnknownField { label: label.clone() })?;
                if label == ACTION || last.is_some_and(|prev| position <= prev) {
                    return Err(ConfigError::InvalidValue {
                        key: format!("effects.{}.fields", spec.name),
                        value: spec.fields.join(", "),
                    }
                    .into());
                }
                last = Some(position);
            }
        }
        Ok(())
    }

    /// Effect names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.effects.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectSpec> {
        self.effects.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
