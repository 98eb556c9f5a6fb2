//! Exemplar synthesis: structurally valid, semantically meaningless
//! instances of sketched types.
//!
//! Used in two places: discovering which tool callbacks a domain parameter
//! type exposes (without real data), and rendering few-shot JSON examples
//! of an expected model output shape. Interface sketches resolve through
//! an explicit registry; the first registration for a name wins, which
//! keeps "choose an implementation arbitrarily" deterministic.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};

use crate::domain::errors::{DiscoveryError, DiscoveryResult};
use crate::domain::models::{FieldSketch, TypeSketch};
use crate::domain::ports::ToolGroup;

/// Number of elements synthesized for list sketches.
const LIST_EXEMPLAR_LEN: usize = 2;

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "eiusmod",
    "tempor", "incididunt", "labore", "magna", "aliqua",
];

/// Derives a tool group from a synthesized exemplar of a domain type.
pub type ToolGroupFactory = Arc<dyn Fn(&Value) -> ToolGroup + Send + Sync>;

/// Registered knowledge about one domain type.
#[derive(Clone)]
pub struct DomainTypeInfo {
    pub sketch: TypeSketch,
    /// Present when values of this type expose tool callbacks.
    pub tool_factory: Option<ToolGroupFactory>,
}

impl DomainTypeInfo {
    pub fn new(sketch: TypeSketch) -> Self {
        Self {
            sketch,
            tool_factory: None,
        }
    }

    pub fn with_tool_factory(mut self, factory: ToolGroupFactory) -> Self {
        self.tool_factory = Some(factory);
        self
    }
}

/// Explicit registry of domain types and interface implementations.
///
/// Replaces classpath scanning: an interface sketch resolves to whatever
/// concrete sketch was registered for its name.
#[derive(Clone, Default)]
pub struct DomainTypeRegistry {
    types: HashMap<String, DomainTypeInfo>,
    interface_impls: HashMap<String, TypeSketch>,
}

impl DomainTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, name: impl Into<String>, info: DomainTypeInfo) {
        self.types.insert(name.into(), info);
    }

    /// Register a concrete sketch for an interface name. The first
    /// registration wins; later ones are ignored.
    pub fn register_interface_impl(&mut self, interface: impl Into<String>, concrete: TypeSketch) {
        self.interface_impls.entry(interface.into()).or_insert(concrete);
    }

    pub fn type_info(&self, name: &str) -> Option<&DomainTypeInfo> {
        self.types.get(name)
    }

    pub fn interface_impl(&self, name: &str) -> Option<&TypeSketch> {
        self.interface_impls.get(name)
    }
}

/// Synthesizes exemplar values from sketches.
#[derive(Clone)]
pub struct ExemplarGenerator {
    registry: Arc<DomainTypeRegistry>,
}

impl ExemplarGenerator {
    pub fn new(registry: Arc<DomainTypeRegistry>) -> Self {
        Self { registry }
    }

    /// Produce a plausible instance of the sketched type.
    ///
    /// Fails only when an interface has no registered implementation,
    /// which is a discovery-time error.
    pub fn synthesize(&self, sketch: &TypeSketch) -> DiscoveryResult<Value> {
        let mut rng = rand::thread_rng();
        self.synthesize_with(&mut rng, sketch)
    }

    fn synthesize_with<R: Rng>(&self, rng: &mut R, sketch: &TypeSketch) -> DiscoveryResult<Value> {
        match sketch {
            TypeSketch::Text => Ok(Value::String(lorem_phrase(rng))),
            TypeSketch::Integer => Ok(json!(rng.gen_range(0..1_000))),
            TypeSketch::Float => {
                let raw: f64 = rng.gen_range(0.0..100.0);
                Ok(json!((raw * 100.0).round() / 100.0))
            }
            TypeSketch::Boolean => Ok(json!(rng.gen_bool(0.5))),
            TypeSketch::Timestamp => Ok(Value::String(Utc::now().to_rfc3339())),
            TypeSketch::Enum { variants } => variants
                .choose(rng)
                .map(|v| Value::String(v.clone()))
                .ok_or_else(|| DiscoveryError::NoExemplar("empty enum".to_string())),
            TypeSketch::List { elem } => {
                let mut items = Vec::with_capacity(LIST_EXEMPLAR_LEN);
                for _ in 0..LIST_EXEMPLAR_LEN {
                    items.push(self.synthesize_with(rng, elem)?);
                }
                Ok(Value::Array(items))
            }
            TypeSketch::Struct { fields, .. } => self.synthesize_struct(rng, fields),
            TypeSketch::Interface { name } => {
                let concrete = self
                    .registry
                    .interface_impl(name)
                    .ok_or_else(|| DiscoveryError::NoExemplar(name.clone()))?
                    .clone();
                self.synthesize_with(rng, &concrete)
            }
        }
    }

    fn synthesize_struct<R: Rng>(
        &self,
        rng: &mut R,
        fields: &[FieldSketch],
    ) -> DiscoveryResult<Value> {
        let mut map = serde_json::Map::with_capacity(fields.len());
        for field in fields {
            map.insert(field.name.clone(), self.synthesize_with(rng, &field.sketch)?);
        }
        Ok(Value::Object(map))
    }

    /// Discover the tool group a domain parameter type exposes, by
    /// synthesizing an exemplar and handing it to the registered factory.
    /// Never runs any action.
    pub fn tools_for(&self, type_name: &str) -> DiscoveryResult<Option<ToolGroup>> {
        let Some(info) = self.registry.type_info(type_name) else {
            return Err(DiscoveryError::UnknownDomainType(type_name.to_string()));
        };
        match &info.tool_factory {
            None => Ok(None),
            Some(factory) => {
                let exemplar = self.synthesize(&info.sketch)?;
                Ok(Some(factory(&exemplar)))
            }
        }
    }
}

fn lorem_phrase<R: Rng>(rng: &mut R) -> String {
    let words = rng.gen_range(3..=6);
    (0..words)
        .filter_map(|_| LOREM.choose(&mut *rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FieldSketch;

    fn generator() -> ExemplarGenerator {
        ExemplarGenerator::new(Arc::new(DomainTypeRegistry::new()))
    }

    #[test]
    fn text_exemplars_are_multi_word() {
        let value = generator().synthesize(&TypeSketch::Text).unwrap();
        let text = value.as_str().unwrap();
        assert!(text.split_whitespace().count() >= 3);
    }

    #[test]
    fn struct_exemplars_fill_every_field() {
        let sketch = TypeSketch::record(
            "Review",
            vec![
                FieldSketch::new("stars", TypeSketch::Integer),
                FieldSketch::new("comment", TypeSketch::Text),
                FieldSketch::new(
                    "mood",
                    TypeSketch::Enum {
                        variants: vec!["happy".to_string(), "grumpy".to_string()],
                    },
                ),
            ],
        );
        let value = generator().synthesize(&sketch).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj["stars"].is_i64() || obj["stars"].is_u64());
        assert!(obj["comment"].is_string());
        assert!(["happy", "grumpy"].contains(&obj["mood"].as_str().unwrap()));
    }

    #[test]
    fn lists_have_fixed_small_size() {
        let value = generator()
            .synthesize(&TypeSketch::list(TypeSketch::Integer))
            .unwrap();
        assert_eq!(value.as_array().unwrap().len(), LIST_EXEMPLAR_LEN);
    }

    #[test]
    fn unregistered_interface_fails_discovery() {
        let err = generator()
            .synthesize(&TypeSketch::interface("Payments"))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::NoExemplar(name) if name == "Payments"));
    }

    #[test]
    fn first_interface_registration_wins() {
        let mut registry = DomainTypeRegistry::new();
        registry.register_interface_impl("Notifier", TypeSketch::Text);
        registry.register_interface_impl("Notifier", TypeSketch::Integer);

        let generator = ExemplarGenerator::new(Arc::new(registry));
        let value = generator
            .synthesize(&TypeSketch::interface("Notifier"))
            .unwrap();
        assert!(value.is_string());
    }

    #[test]
    fn tools_for_unknown_type_is_a_discovery_error() {
        let err = generator().tools_for("Ghost").unwrap_err();
        assert!(matches!(err, DiscoveryError::UnknownDomainType(_)));
    }
}
