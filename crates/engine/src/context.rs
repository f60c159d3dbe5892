//! Query context.
//!
//! [`SchemaEnv`] is built once and shared across requests; [`QueryEnv`] is
//! request-scoped and owns the selected operation, the fragment table, the
//! coerced variables and the error sink. Narrow views ([`ContextSelectionSet`],
//! [`ContextField`]) carry the current position in the walk.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    ops::Deref,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_graphql_value::{ConstValue, Name, Variables};
use bracken_parser::{
    types::{Field, FragmentDefinition, OperationDefinition, SelectionSet},
    Positioned,
};
use fnv::FnvHashMap;

use crate::{
    error::{ServerError, ServerResult},
    query_path::QueryPath,
    registry::{MetaField, MetaType, Registry},
};

/// Request- or schema-scoped data, keyed by type.
#[derive(Default)]
pub struct Data(FnvHashMap<TypeId, Box<dyn Any + Sync + Send>>);

impl Data {
    pub fn insert<D: Any + Send + Sync>(&mut self, data: D) {
        self.0.insert(TypeId::of::<D>(), Box::new(data));
    }

    pub fn get<D: Any + Send + Sync>(&self) -> Option<&D> {
        self.0
            .get(&TypeId::of::<D>())
            .and_then(|data| data.downcast_ref::<D>())
    }
}

impl Debug for Data {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Data").finish()
    }
}

/// A cooperative cancellation signal shared by everything in one request.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct SchemaEnvInner {
    pub registry: Registry,
    pub data: Data,
}

/// Schema-scoped environment, shared across requests.
#[derive(Clone)]
pub struct SchemaEnv(Arc<SchemaEnvInner>);

impl SchemaEnv {
    pub fn new(registry: Registry, data: Data) -> Self {
        Self(Arc::new(SchemaEnvInner { registry, data }))
    }
}

impl Deref for SchemaEnv {
    type Target = SchemaEnvInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct QueryEnvInner {
    /// The operation selected for this request.
    pub operation: Positioned<OperationDefinition>,
    pub operation_name: Option<String>,
    pub fragments: HashMap<Name, Positioned<FragmentDefinition>>,
    /// Coerced variables; written once during setup, read-only afterwards.
    pub variables: Variables,
    pub ctx_data: Arc<Data>,
    /// Appends are serialized; concurrent field tasks push here.
    pub errors: Mutex<Vec<ServerError>>,
    pub cancellation: Cancellation,
}

/// Request-scoped environment.
#[derive(Clone)]
pub struct QueryEnv(Arc<QueryEnvInner>);

impl Deref for QueryEnv {
    type Target = QueryEnvInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl QueryEnv {
    pub fn new(inner: QueryEnvInner) -> QueryEnv {
        QueryEnv(Arc::new(inner))
    }

    pub fn create_context<'a>(
        &'a self,
        schema_env: &'a SchemaEnv,
        item: &'a Positioned<SelectionSet>,
        root_type: &'a MetaType,
    ) -> ContextSelectionSet<'a> {
        ContextSelectionSet {
            ty: root_type,
            path: QueryPath::empty(),
            item,
            schema_env,
            query_env: self,
        }
    }

    /// Drain the accumulated errors.
    pub fn take_errors(&self) -> Vec<ServerError> {
        let mut errors = self.errors.lock().expect("error sink poisoned");
        std::mem::take(&mut *errors)
    }
}

pub trait Context<'a> {
    fn path(&self) -> &QueryPath;
    fn query_env(&self) -> &'a QueryEnv;
    fn schema_env(&self) -> &'a SchemaEnv;

    fn registry(&self) -> &'a Registry {
        &self.schema_env().registry
    }
}

/// Shared behaviour of the selection-set and field contexts.
pub trait ContextExt<'a>: Context<'a> {
    /// Find a fragment definition by name.
    fn get_fragment(&self, name: &str) -> Option<&'a Positioned<FragmentDefinition>> {
        self.query_env().fragments.get(name)
    }

    /// Attach the current response path to an error that does not carry one.
    fn set_error_path(&self, error: ServerError) -> ServerError {
        if !error.path.is_empty() {
            return error;
        }
        ServerError {
            path: self.path().clone(),
            ..error
        }
    }

    /// Report a field error; the field's value becomes null.
    fn add_error(&self, error: ServerError) {
        self.query_env()
            .errors
            .lock()
            .expect("error sink poisoned")
            .push(error);
    }

    fn is_canceled(&self) -> bool {
        self.query_env().cancellation.is_canceled()
    }

    /// Request-scoped data of type `D`, falling back to schema data.
    fn data_opt<D: Any + Send + Sync>(&self) -> Option<&'a D> {
        self.query_env()
            .ctx_data
            .get::<D>()
            .or_else(|| self.schema_env().data.get::<D>())
    }

    /// The coerced value of a variable. Absent nullable variables coerce to
    /// null inside nested literals.
    fn var_value(&self, name: &str) -> ConstValue {
        self.query_env()
            .variables
            .get(name)
            .cloned()
            .unwrap_or(ConstValue::Null)
    }
}

impl<'a, T> ContextExt<'a> for T where T: Context<'a> + ?Sized {}

/// Context while walking a selection set of a concrete composite type.
#[derive(Clone)]
pub struct ContextSelectionSet<'a> {
    /// The composite type the selections apply to.
    pub ty: &'a MetaType,
    pub path: QueryPath,
    pub item: &'a Positioned<SelectionSet>,
    pub schema_env: &'a SchemaEnv,
    pub query_env: &'a QueryEnv,
}

impl<'a> ContextSelectionSet<'a> {
    /// Narrow to a single field of this selection set.
    pub fn with_field(
        &self,
        field: &'a Positioned<Field>,
        field_def: &'a MetaField,
    ) -> ContextField<'a> {
        ContextField {
            path: self.path.child(field.node.response_key().node.as_str()),
            item: field,
            parent_type: self.ty,
            field: field_def,
            schema_env: self.schema_env,
            query_env: self.query_env,
        }
    }

    /// The same selections against another target type (fragment narrowing).
    #[must_use]
    pub fn with_type(&self, ty: &'a MetaType) -> ContextSelectionSet<'a> {
        ContextSelectionSet {
            ty,
            path: self.path.clone(),
            item: self.item,
            schema_env: self.schema_env,
            query_env: self.query_env,
        }
    }
}

impl<'a> Context<'a> for ContextSelectionSet<'a> {
    fn path(&self) -> &QueryPath {
        &self.path
    }

    fn query_env(&self) -> &'a QueryEnv {
        self.query_env
    }

    fn schema_env(&self) -> &'a SchemaEnv {
        self.schema_env
    }
}

impl Debug for ContextSelectionSet<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSelectionSet")
            .field("ty", &self.ty.name())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Context while resolving one field.
#[derive(Clone)]
pub struct ContextField<'a> {
    /// Path of this field in the response, response key included.
    pub path: QueryPath,
    pub item: &'a Positioned<Field>,
    pub parent_type: &'a MetaType,
    pub field: &'a MetaField,
    pub schema_env: &'a SchemaEnv,
    pub query_env: &'a QueryEnv,
}

impl<'a> ContextField<'a> {
    /// Open the field's sub-selections against the concrete type `ty`.
    pub fn with_selection_set(
        &self,
        ty: &'a MetaType,
        path: QueryPath,
    ) -> ContextSelectionSet<'a> {
        ContextSelectionSet {
            ty,
            path,
            item: &self.item.node.selection_set,
            schema_env: self.schema_env,
            query_env: self.query_env,
        }
    }
}

impl<'a> Context<'a> for ContextField<'a> {
    fn path(&self) -> &QueryPath {
        &self.path
    }

    fn query_env(&self) -> &'a QueryEnv {
        self.query_env
    }

    fn schema_env(&self) -> &'a SchemaEnv {
        self.schema_env
    }
}

impl Debug for ContextField<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextField")
            .field("path", &self.path)
            .field("field", &self.field.name)
            .finish_non_exhaustive()
    }
}
