use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock};

use gpui::SharedString;
use rust_decimal::Decimal;

use crate::render::{ControllerFn, RendererFn};
use crate::resolve::FieldType;
use crate::schema::{NodeId, Schema};
use crate::value::Values;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub(crate) type ConditionFn = Arc<dyn Fn(&Values) -> Result<bool, BoxError> + Send + Sync>;

/// A flag that is either fixed or computed from the current form values.
#[derive(Clone)]
pub enum Conditional {
    Literal(bool),
    Computed(ConditionFn),
}

impl Conditional {
    pub fn computed(
        condition: impl Fn(&Values) -> Result<bool, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Conditional::Computed(Arc::new(condition))
    }

    /// Computed flag that cannot fail.
    pub fn when(condition: impl Fn(&Values) -> bool + Send + Sync + 'static) -> Self {
        Conditional::Computed(Arc::new(move |values| Ok(condition(values))))
    }

    /// Current flag value; a failing or panicking computation yields `default`.
    pub fn evaluate(&self, values: &Values, default: bool) -> bool {
        match self {
            Conditional::Literal(value) => *value,
            Conditional::Computed(condition) => {
                match catch_unwind(AssertUnwindSafe(|| condition(values))) {
                    Ok(Ok(value)) => value,
                    Ok(Err(error)) => {
                        tracing::error!(
                            target: "conditional-error",
                            %error,
                            default,
                            "conditional evaluation failed"
                        );
                        default
                    }
                    Err(_) => {
                        tracing::error!(
                            target: "conditional-error",
                            default,
                            "conditional evaluation panicked"
                        );
                        default
                    }
                }
            }
        }
    }
}

impl From<bool> for Conditional {
    fn from(value: bool) -> Self {
        Conditional::Literal(value)
    }
}

impl Debug for Conditional {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Conditional::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Conditional::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Evaluates an optional flag, treating "not set" as `default`.
pub fn evaluate_conditional(flag: Option<&Conditional>, values: &Values, default: bool) -> bool {
    flag.map_or(default, |flag| flag.evaluate(values, default))
}

/// Presentation metadata attached to one schema node.
#[derive(Clone, Default)]
pub struct FieldMeta {
    pub field_type: Option<FieldType>,
    pub label: Option<SharedString>,
    pub placeholder: Option<SharedString>,
    /// Inline markdown is rendered.
    pub description: Option<SharedString>,
    pub disabled: Option<Conditional>,
    pub hidden: Option<Conditional>,
    pub readonly: Option<Conditional>,
    pub half_width: bool,
    pub with_controls: bool,
    pub step: Option<Decimal>,
    pub resize: Option<bool>,
    pub renderer: Option<RendererFn>,
    pub controller: Option<ControllerFn>,
}

impl FieldMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn label(mut self, label: impl Into<SharedString>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn description(mut self, description: impl Into<SharedString>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn disabled(mut self, disabled: impl Into<Conditional>) -> Self {
        self.disabled = Some(disabled.into());
        self
    }

    pub fn hidden(mut self, hidden: impl Into<Conditional>) -> Self {
        self.hidden = Some(hidden.into());
        self
    }

    pub fn readonly(mut self, readonly: impl Into<Conditional>) -> Self {
        self.readonly = Some(readonly.into());
        self
    }

    pub fn half_width(mut self, half_width: bool) -> Self {
        self.half_width = half_width;
        self
    }

    pub fn with_controls(mut self, with_controls: bool) -> Self {
        self.with_controls = with_controls;
        self
    }

    pub fn step(mut self, step: impl Into<Decimal>) -> Self {
        self.step = Some(step.into());
        self
    }

    pub fn resize(mut self, resize: bool) -> Self {
        self.resize = Some(resize);
        self
    }

    pub fn renderer(mut self, renderer: RendererFn) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn controller(mut self, controller: ControllerFn) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.field_type.is_none()
            && self.label.is_none()
            && self.placeholder.is_none()
            && self.description.is_none()
            && self.disabled.is_none()
            && self.hidden.is_none()
            && self.readonly.is_none()
            && !self.half_width
            && !self.with_controls
            && self.step.is_none()
            && self.resize.is_none()
            && self.renderer.is_none()
            && self.controller.is_none()
    }
}

impl Debug for FieldMeta {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMeta")
            .field("field_type", &self.field_type)
            .field("label", &self.label)
            .field("placeholder", &self.placeholder)
            .field("description", &self.description)
            .field("disabled", &self.disabled)
            .field("hidden", &self.hidden)
            .field("readonly", &self.readonly)
            .field("half_width", &self.half_width)
            .field("with_controls", &self.with_controls)
            .field("step", &self.step)
            .field("resize", &self.resize)
            .field("renderer", &self.renderer.is_some())
            .field("controller", &self.controller.is_some())
            .finish()
    }
}

static EMPTY_META: LazyLock<FieldMeta> = LazyLock::new(FieldMeta::default);

/// Side table of presentation metadata keyed by schema node identity.
#[derive(Clone, Debug, Default)]
pub struct MetadataRegistry {
    entries: HashMap<NodeId, FieldMeta>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `meta` to `node`, replacing anything registered earlier.
    pub fn register(&mut self, node: &Schema, meta: FieldMeta) {
        self.entries.insert(node.id(), meta);
    }

    /// Metadata of `node`, or an empty entry.
    pub fn get(&self, node: &Schema) -> &FieldMeta {
        self.lookup(node).unwrap_or(LazyLock::force(&EMPTY_META))
    }

    pub fn lookup(&self, node: &Schema) -> Option<&FieldMeta> {
        self.entries.get(&node.id())
    }

    pub fn contains(&self, node: &Schema) -> bool {
        self.entries.contains_key(&node.id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Conditional, FieldMeta, MetadataRegistry};
    use crate::schema::z;
    use crate::value::{FieldValue, values};

    #[test]
    fn lookup_follows_node_identity_not_structure() {
        let mut registry = MetadataRegistry::new();
        let email = z::string().email();
        let twin = email.fork();
        let shared = email.clone();
        registry.register(&email, FieldMeta::new().label("Work email"));

        assert_eq!(
            registry.get(&shared).label.as_ref().map(|label| label.as_ref()),
            Some("Work email")
        );
        assert!(registry.get(&twin).is_empty());
        assert!(!registry.contains(&email.clone().optional()));
    }

    #[test]
    fn later_registration_replaces_earlier_one() {
        let mut registry = MetadataRegistry::new();
        let node = z::string();
        registry.register(&node, FieldMeta::new().label("First"));
        registry.register(&node, FieldMeta::new().placeholder("Second"));

        let meta = registry.get(&node);
        assert!(meta.label.is_none());
        assert_eq!(
            meta.placeholder.as_ref().map(|text| text.as_ref()),
            Some("Second")
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn computed_conditional_reads_values() {
        let hidden = Conditional::when(|values| {
            values.get("subscribe").and_then(FieldValue::as_bool) == Some(false)
        });
        assert!(hidden.evaluate(&values([("subscribe", false)]), false));
        assert!(!hidden.evaluate(&values([("subscribe", true)]), false));
    }

    #[test]
    fn failing_conditional_falls_back_to_default() {
        let failing = Conditional::computed(|_| Err("lookup failed".into()));
        assert!(failing.evaluate(&values::<&str, bool>([]), true));
        assert!(!failing.evaluate(&values::<&str, bool>([]), false));

        let panicking = Conditional::when(|_| panic!("boom"));
        assert!(panicking.evaluate(&values::<&str, bool>([]), true));
    }
}
