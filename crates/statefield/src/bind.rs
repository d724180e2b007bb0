//! # Binding a Machine to a Schema Field
//!
//! [`bind_state_machine`] attaches a [`MachineSpec`] to one real field of a
//! [`Schema`], making transitions the only way that field changes while the
//! field always mirrors the machine's current state — across construction,
//! mutation, persistence, and reload.
//!
//! Binding runs once per schema, in a fixed order:
//!
//! 1. **Validate** — the target field must be a declared real field, no
//!    declared field may reuse a reserved identifier, and no declared field
//!    may share a name with a transition. Validation is pure; on failure
//!    the schema is left untouched.
//! 2. **Guard** — a setter appended to the target field's chain makes
//!    unauthorized assignments a no-op (or an error, per
//!    [`GuardPolicy`]).
//! 3. **Bridge** — the spec's enter-state hook is wrapped, not replaced:
//!    the wrapper authorizes exactly one write of the destination state
//!    through the ordinary assignment path, revokes, then forwards the
//!    event to the caller's hook with the document as receiver.
//! 4. **Lifecycle** — a construct hook attaches a fresh machine in the
//!    spec's declared initial state; a hydrate hook attaches using the
//!    field's persisted value instead. Exactly one of the two runs per
//!    document instance.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use statefield_core::{is_reserved, FieldName, StateId};
use statefield_document::{Document, DocumentError, FieldBinding, Schema, SetterFn};
use statefield_machine::{
    EnterStateEvent, EnterStateHook, HookError, Machine, MachineDefinition, MachineHost,
    MachineSpec, TransitionDef,
};

// ─── Options ────────────────────────────────────────────────────────

/// What happens to writes on the bound field outside a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardPolicy {
    /// The stored value is kept unchanged; the assignment is a silent
    /// no-op. This is documented behavior, not an error.
    #[default]
    Ignore,
    /// The assignment fails with [`DocumentError::WriteRejected`].
    Reject,
}

/// Configuration for one schema binding.
pub struct BindOptions {
    /// The real field that mirrors the machine's state.
    pub field_name: FieldName,
    /// The machine to bind. Its enter-state hook, if any, is preserved by
    /// composition.
    pub machine: MachineSpec<Document>,
    /// Unauthorized-write handling for the bound field.
    pub guard_policy: GuardPolicy,
}

impl BindOptions {
    /// Options for `machine` with the default field name (`status`) and
    /// the default guard policy.
    pub fn new(machine: MachineSpec<Document>) -> Self {
        Self {
            field_name: FieldName::from("status"),
            machine,
            guard_policy: GuardPolicy::default(),
        }
    }

    /// Bind to `field` instead of `status`.
    pub fn field(mut self, field: impl Into<FieldName>) -> Self {
        self.field_name = field.into();
        self
    }

    /// Set the unauthorized-write policy.
    pub fn guard_policy(mut self, policy: GuardPolicy) -> Self {
        self.guard_policy = policy;
        self
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Setup-time binding failures. All are fatal to the binding; the schema
/// is left unmodified.
#[derive(Error, Debug)]
pub enum BindError {
    /// The target field is not declared as a real field.
    #[error("schema '{schema}' has no real field '{field}' to bind")]
    FieldNotFound {
        /// The schema that was inspected.
        schema: String,
        /// The missing field.
        field: FieldName,
    },

    /// A declared field reuses a name the binding surface exposes.
    #[error("schema field '{field}' is a reserved identifier")]
    ReservedNameCollision {
        /// The offending field.
        field: FieldName,
    },

    /// A declared field shares its name with a transition.
    #[error("schema field '{field}' collides with a transition name")]
    TransitionNameCollision {
        /// The offending field.
        field: FieldName,
    },

    /// The schema already carries a binding; binding twice would
    /// double-wrap the enter-state hook.
    #[error("schema '{schema}' already has a state machine bound to field '{field}'")]
    AlreadyBound {
        /// The schema that was inspected.
        schema: String,
        /// The field the existing binding targets.
        field: FieldName,
    },
}

// ─── Schema Validation ──────────────────────────────────────────────

/// Validate a schema/spec pair for binding.
///
/// Pure: inspects, never mutates, so re-validating an already-valid pair
/// is the same success with no side effects. Checks run in a fixed order
/// and report the first offender by name.
pub fn validate(
    schema: &Schema,
    field_name: &FieldName,
    transitions: &[TransitionDef],
) -> Result<(), BindError> {
    if !schema.has_real_field(field_name.as_str()) {
        return Err(BindError::FieldNotFound {
            schema: schema.name().to_string(),
            field: field_name.clone(),
        });
    }

    for def in schema.fields() {
        if is_reserved(def.name.as_str()) {
            return Err(BindError::ReservedNameCollision {
                field: def.name.clone(),
            });
        }
    }

    for def in schema.fields() {
        if transitions.iter().any(|t| t.name == def.name.as_str()) {
            return Err(BindError::TransitionNameCollision {
                field: def.name.clone(),
            });
        }
    }

    Ok(())
}

// ─── Guarded Write Path ─────────────────────────────────────────────

/// The interceptor installed on the bound field. Authorized writes pass
/// through; everything else is resolved by the policy.
fn guard_setter(field: FieldName, policy: GuardPolicy) -> SetterFn {
    Arc::new(move |doc: &Document, candidate: Value| {
        if doc.write_gate().is_authorized() {
            return Ok(candidate);
        }
        match policy {
            GuardPolicy::Ignore => Ok(doc
                .get(field.as_str())
                .cloned()
                .unwrap_or(Value::Null)),
            GuardPolicy::Reject => Err(DocumentError::WriteRejected {
                field: field.clone(),
            }),
        }
    })
}

// ─── State Synchronization ──────────────────────────────────────────

/// Wrap the caller's enter-state hook with the field synchronization.
///
/// The write is skipped when the field already holds the destination
/// state — which is exactly the hydration `init` event and any self-loop
/// transition. The caller's hook still runs for every event the engine
/// fires; whether self-loops notify is the engine's decision, mirrored
/// here, not re-decided.
fn bridge(field: FieldName, user_hook: Option<EnterStateHook<Document>>) -> EnterStateHook<Document> {
    Arc::new(move |doc: &mut Document, event: &EnterStateEvent| {
        let target = Value::String(event.to.as_str().to_string());
        if doc.get(field.as_str()) != Some(&target) {
            doc.write_gate_mut().authorize();
            let write = doc.set(field.as_str(), target);
            doc.write_gate_mut().revoke();
            write.map_err(|e| Box::new(e) as HookError)?;
        }

        // The field is synchronized before the caller's hook observes the
        // document; a hook failure propagates without rolling it back.
        if let Some(user_hook) = &user_hook {
            user_hook(doc, event)?;
        }
        Ok(())
    })
}

// ─── Lifecycle Attachment ───────────────────────────────────────────

/// Register the construct and hydrate hooks that attach a machine to each
/// document instance. Exactly one of the two fires per instance.
fn register_lifecycle(
    schema: &mut Schema,
    field: FieldName,
    definition: Arc<MachineDefinition<Document>>,
) {
    let construct_definition = definition.clone();
    schema.on_construct(Arc::new(move |doc: &mut Document| {
        // Only freshly constructed documents; skip if a machine is
        // somehow already attached.
        if !doc.is_new() || doc.machine().is_some() {
            return Ok(());
        }
        Machine::attach(doc, construct_definition.clone(), None).map_err(DocumentError::lifecycle)
    }));

    schema.on_hydrate(Arc::new(move |doc: &mut Document| {
        // The persisted value is authoritative over the declared initial
        // state. A missing or non-string value falls back to the default.
        let persisted = doc
            .get(field.as_str())
            .and_then(Value::as_str)
            .map(StateId::from);
        Machine::attach(doc, definition.clone(), persisted).map_err(DocumentError::lifecycle)
    }));
}

// ─── Entry Point ────────────────────────────────────────────────────

/// Bind `options.machine` to `options.field_name` on `schema`.
///
/// Runs once per schema; a second call fails with
/// [`BindError::AlreadyBound`]. On any error the schema is left
/// unmodified.
pub fn bind_state_machine(schema: &mut Schema, options: BindOptions) -> Result<(), BindError> {
    let BindOptions {
        field_name,
        machine,
        guard_policy,
    } = options;

    if let Some(binding) = schema.state_binding() {
        return Err(BindError::AlreadyBound {
            schema: schema.name().to_string(),
            field: binding.field_name.clone(),
        });
    }

    validate(schema, &field_name, &machine.transitions)?;

    schema
        .add_setter(&field_name, guard_setter(field_name.clone(), guard_policy))
        .map_err(|_| BindError::FieldNotFound {
            schema: schema.name().to_string(),
            field: field_name.clone(),
        })?;
    schema.set_state_binding(FieldBinding {
        field_name: field_name.clone(),
        guarded: true,
    });

    let MachineSpec {
        initial_state,
        transitions,
        on_enter_state,
    } = machine;
    let definition = Arc::new(MachineDefinition::new(
        initial_state,
        transitions,
        Some(bridge(field_name.clone(), on_enter_state)),
    ));

    register_lifecycle(schema, field_name, definition);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matter_spec() -> MachineSpec<Document> {
        MachineSpec::builder("solid")
            .transition("melt", ["solid"], "liquid")
            .transition("freeze", ["liquid"], "solid")
            .transition("vaporize", ["liquid"], "gas")
            .transition("condense", ["gas"], "liquid")
            .build()
    }

    fn matter_schema() -> Schema {
        Schema::builder("matter")
            .real_field("matter_state")
            .real_field("label")
            .build()
    }

    #[test]
    fn test_validate_accepts_valid_pair() {
        let schema = matter_schema();
        let spec = matter_spec();
        let field = FieldName::from("matter_state");
        assert!(validate(&schema, &field, &spec.transitions).is_ok());
        // Pure — validating again is the same success.
        assert!(validate(&schema, &field, &spec.transitions).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let schema = matter_schema();
        let err = validate(
            &schema,
            &FieldName::from("phase"),
            &matter_spec().transitions,
        )
        .unwrap_err();
        assert!(matches!(err, BindError::FieldNotFound { ref field, .. } if *field == "phase"));
    }

    #[test]
    fn test_validate_rejects_virtual_field() {
        let schema = Schema::builder("matter")
            .virtual_field("matter_state")
            .build();
        let err = validate(
            &schema,
            &FieldName::from("matter_state"),
            &matter_spec().transitions,
        )
        .unwrap_err();
        assert!(matches!(err, BindError::FieldNotFound { .. }));
    }

    #[test]
    fn test_validate_rejects_reserved_field_name() {
        let schema = Schema::builder("matter")
            .real_field("matter_state")
            .real_field("state")
            .build();
        let err = validate(
            &schema,
            &FieldName::from("matter_state"),
            &matter_spec().transitions,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BindError::ReservedNameCollision { ref field } if *field == "state"
        ));
    }

    #[test]
    fn test_validate_rejects_field_named_like_transition() {
        let schema = Schema::builder("matter")
            .real_field("matter_state")
            .real_field("melt")
            .build();
        let err = validate(
            &schema,
            &FieldName::from("matter_state"),
            &matter_spec().transitions,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BindError::TransitionNameCollision { ref field } if *field == "melt"
        ));
    }

    #[test]
    fn test_bind_installs_binding_record() {
        let mut schema = matter_schema();
        bind_state_machine(
            &mut schema,
            BindOptions::new(matter_spec()).field("matter_state"),
        )
        .unwrap();

        let binding = schema.state_binding().unwrap();
        assert_eq!(binding.field_name, "matter_state");
        assert!(binding.guarded);
    }

    #[test]
    fn test_bind_twice_refused() {
        let mut schema = matter_schema();
        bind_state_machine(
            &mut schema,
            BindOptions::new(matter_spec()).field("matter_state"),
        )
        .unwrap();
        let err = bind_state_machine(
            &mut schema,
            BindOptions::new(matter_spec()).field("matter_state"),
        )
        .unwrap_err();
        assert!(matches!(err, BindError::AlreadyBound { .. }));
    }

    #[test]
    fn test_failed_bind_leaves_schema_untouched() {
        let mut schema = Schema::builder("matter")
            .real_field("matter_state")
            .real_field("melt")
            .build();
        let err = bind_state_machine(
            &mut schema,
            BindOptions::new(matter_spec()).field("matter_state"),
        )
        .unwrap_err();
        assert!(matches!(err, BindError::TransitionNameCollision { .. }));
        assert!(schema.state_binding().is_none());

        // The failed attempt installed nothing: fixing the schema and
        // binding again succeeds.
        let mut schema = matter_schema();
        bind_state_machine(
            &mut schema,
            BindOptions::new(matter_spec()).field("matter_state"),
        )
        .unwrap();
    }

    #[test]
    fn test_default_field_name_is_status() {
        let options = BindOptions::new(matter_spec());
        assert_eq!(options.field_name, "status");
        assert_eq!(options.guard_policy, GuardPolicy::Ignore);
    }

    #[test]
    fn test_guard_setter_passes_authorized_writes() {
        let schema = Arc::new(matter_schema());
        let mut doc = Document::new(schema).unwrap();
        let setter = guard_setter(FieldName::from("matter_state"), GuardPolicy::Ignore);

        doc.write_gate_mut().authorize();
        let stored = setter(&doc, json!("liquid")).unwrap();
        assert_eq!(stored, json!("liquid"));
    }

    #[test]
    fn test_guard_setter_ignore_keeps_current_value() {
        let schema = Arc::new(matter_schema());
        let mut doc = Document::new(schema).unwrap();
        doc.write_gate_mut().authorize();
        doc.set("matter_state", json!("solid")).unwrap();
        doc.write_gate_mut().revoke();

        let setter = guard_setter(FieldName::from("matter_state"), GuardPolicy::Ignore);
        let stored = setter(&doc, json!("plasma")).unwrap();
        assert_eq!(stored, json!("solid"));
    }

    #[test]
    fn test_guard_setter_reject_policy() {
        let schema = Arc::new(matter_schema());
        let doc = Document::new(schema).unwrap();
        let setter = guard_setter(FieldName::from("matter_state"), GuardPolicy::Reject);
        let err = setter(&doc, json!("plasma")).unwrap_err();
        assert!(matches!(err, DocumentError::WriteRejected { .. }));
    }
}
