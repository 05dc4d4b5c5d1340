//! Service registry and operation resolution.
//!
//! The registry is built once at startup. For every method of every
//! registered service it classifies the verb, derives the path template and
//! parameter bindings, interns value shapes, and inserts the operation into
//! a segment trie. Any inconsistency fails the build with a
//! [`ConfigurationError`]. Afterwards the registry is immutable and is shared
//! by `Arc` between request handlers and the documentation generator.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use slate_router::{Params, PathTemplate, Router};

use crate::conventions::Conventions;
use crate::error::{ConfigResult, ConfigurationError, ResolveError};
use crate::reflect::{TypeInfo, TypeKind};
use crate::service::{MethodInfo, ParamInfo, ParamSource, ServiceInfo, WebService};
use crate::shape::{ShapeId, ShapeTable};
use crate::verb::HttpVerb;

/// Creates a fresh service instance for one request.
pub type ServiceFactory = Arc<dyn Fn() -> Box<dyn WebService> + Send + Sync>;

/// A registered service: its prefix, reflected description and factory.
pub struct ServiceDescriptor {
    prefix: String,
    info: ServiceInfo,
    factory: ServiceFactory,
}

impl ServiceDescriptor {
    /// Returns the normalized path prefix (empty for the root).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the reflected service description.
    pub fn info(&self) -> &ServiceInfo {
        &self.info
    }

    /// Returns the service type name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Creates a new service instance.
    pub fn instantiate(&self) -> Box<dyn WebService> {
        (self.factory)()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("prefix", &self.prefix)
            .field("name", &self.info.name)
            .finish_non_exhaustive()
    }
}

/// How one parameter is bound from a request.
#[derive(Debug, Clone)]
pub struct ParamBinding {
    /// The reflected parameter
    pub param: ParamInfo,
    /// Where the value comes from
    pub source: ParamSource,
    /// Interned value shape
    pub shape: ShapeId,
    /// Whether the request must supply the value
    pub required: bool,
    /// Whether a query key may repeat
    pub collection: bool,
}

impl ParamBinding {
    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.param.name
    }
}

/// One dispatchable operation, fixed at registry build time.
#[derive(Debug, Clone)]
pub struct OperationCandidate {
    /// `Service.method`
    pub id: String,
    /// The declaring service
    pub service: Arc<ServiceDescriptor>,
    /// The reflected method
    pub method: MethodInfo,
    /// Verb, classified once
    pub verb: HttpVerb,
    /// Full path template including the service prefix
    pub template: PathTemplate,
    /// Parameter bindings in declaration order
    pub bindings: Vec<ParamBinding>,
    /// Interned shape of the return type
    pub returns: ShapeId,
}

impl OperationCandidate {
    /// Returns the body binding, if any.
    pub fn body(&self) -> Option<&ParamBinding> {
        self.bindings.iter().find(|b| b.source == ParamSource::Body)
    }

    /// Returns bindings read from `source`.
    pub fn bindings_from(&self, source: ParamSource) -> impl Iterator<Item = &ParamBinding> {
        self.bindings.iter().filter(move |b| b.source == source)
    }
}

/// The operation chosen for a request, with its captured path values.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// The matched operation
    pub candidate: &'a OperationCandidate,
    /// Percent-decoded placeholder values
    pub params: Params,
}

/// Immutable table of every operation the API exposes.
///
/// # Example
///
/// ```rust
/// use slate_core::{
///     output, Arguments, HttpVerb, MethodInfo, ParamInfo, ParamSource, ServiceError,
///     ServiceInfo, ServiceRegistry, TypeRef, Value, WebService,
/// };
///
/// struct Things;
///
/// impl WebService for Things {
///     fn service_info() -> ServiceInfo {
///         ServiceInfo::new("Things").method(
///             MethodInfo::new("get_thing")
///                 .param(ParamInfo::new("id", TypeRef::of::<u64>()).source(ParamSource::Path))
///                 .returns(TypeRef::of::<String>()),
///         )
///     }
///
///     fn invoke(&self, method: &str, mut args: Arguments) -> Result<Value, ServiceError> {
///         match method {
///             "get_thing" => output::from_value(&format!("thing {}", args.take::<u64>(0)?)),
///             _ => Err(ServiceError::unknown_method(method)),
///         }
///     }
/// }
///
/// let registry = ServiceRegistry::builder().register("/path", || Things).build().unwrap();
/// let resolved = registry.resolve(HttpVerb::Get, "/path/thing/7", Vec::<&str>::new()).unwrap();
/// assert_eq!(resolved.candidate.template.to_string(), "/path/thing/{id}");
/// assert_eq!(resolved.params.get("id"), Some("7"));
/// ```
pub struct ServiceRegistry {
    conventions: Arc<Conventions>,
    services: Vec<Arc<ServiceDescriptor>>,
    candidates: Vec<OperationCandidate>,
    router: Router<usize>,
    shapes: ShapeTable,
}

impl ServiceRegistry {
    /// Starts a builder with default conventions.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new(Conventions::default())
    }

    /// Returns the conventions the registry was built with.
    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// Returns the registered services, in registration order.
    pub fn services(&self) -> &[Arc<ServiceDescriptor>] {
        &self.services
    }

    /// Returns every operation, in registration then declaration order.
    pub fn candidates(&self) -> &[OperationCandidate] {
        &self.candidates
    }

    /// Returns the interned value shapes.
    pub fn shapes(&self) -> &ShapeTable {
        &self.shapes
    }

    /// Picks the operation for `verb` and `path`.
    ///
    /// `query_keys` are the keys present in the request's query string. A
    /// required query parameter missing from them fails resolution.
    pub fn resolve<K: AsRef<str>>(
        &self,
        verb: HttpVerb,
        path: &str,
        query_keys: impl IntoIterator<Item = K>,
    ) -> Result<Resolution<'_>, ResolveError> {
        let matches = self.router.match_all(&verb.method(), path);
        let route = match matches.as_slice() {
            [] => {
                return Err(ResolveError::NotFound {
                    verb: verb.to_string(),
                    path: path.to_string(),
                })
            }
            [route] => route,
            many => {
                return Err(ResolveError::Ambiguous {
                    verb: verb.to_string(),
                    path: path.to_string(),
                    candidates: many
                        .iter()
                        .map(|m| self.candidates[*m.value].id.clone())
                        .collect(),
                })
            }
        };

        let candidate = &self.candidates[*route.value];
        let keys: Vec<K> = query_keys.into_iter().collect();
        if let Some(missing) = candidate
            .bindings_from(ParamSource::Query)
            .filter(|b| b.required)
            .find(|b| !keys.iter().any(|k| k.as_ref() == b.name()))
        {
            return Err(ResolveError::MissingParameter {
                operation: candidate.id.clone(),
                parameter: missing.name().to_string(),
            });
        }

        Ok(Resolution {
            candidate,
            params: route.params.clone(),
        })
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services)
            .field("operations", &self.candidates.len())
            .finish_non_exhaustive()
    }
}

struct PendingService {
    prefix: String,
    info: ServiceInfo,
    factory: ServiceFactory,
}

/// Collects services and validates them into a [`ServiceRegistry`].
pub struct RegistryBuilder {
    conventions: Arc<Conventions>,
    pending: Vec<PendingService>,
}

impl RegistryBuilder {
    /// Starts a builder using `conventions`.
    pub fn new(conventions: Conventions) -> Self {
        Self::with_shared(Arc::new(conventions))
    }

    /// Starts a builder sharing an existing convention set.
    pub fn with_shared(conventions: Arc<Conventions>) -> Self {
        Self {
            conventions,
            pending: Vec::new(),
        }
    }

    /// Registers service `S` under `prefix`.
    ///
    /// `factory` is called once per request.
    #[must_use]
    pub fn register<S, F>(self, prefix: impl Into<String>, factory: F) -> Self
    where
        S: WebService,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.register_dyn(
            prefix,
            S::service_info(),
            Arc::new(move || Box::new(factory()) as Box<dyn WebService>),
        )
    }

    /// Registers a service from an explicit description and factory.
    #[must_use]
    pub fn register_dyn(
        mut self,
        prefix: impl Into<String>,
        info: ServiceInfo,
        factory: ServiceFactory,
    ) -> Self {
        self.pending.push(PendingService {
            prefix: prefix.into(),
            info,
            factory,
        });
        self
    }

    /// Validates every service and builds the registry.
    pub fn build(self) -> ConfigResult<ServiceRegistry> {
        let conventions = self.conventions;
        let mut services = Vec::with_capacity(self.pending.len());
        let mut candidates: Vec<OperationCandidate> = Vec::new();
        let mut router = Router::new();
        let mut shapes = ShapeTable::new();
        let mut prefixes = HashSet::new();

        for pending in self.pending {
            let prefix = normalize_prefix(&pending.prefix)?;
            if !prefixes.insert(prefix.clone()) {
                return Err(ConfigurationError::DuplicateServicePrefix { prefix });
            }

            let service = Arc::new(ServiceDescriptor {
                prefix,
                info: pending.info,
                factory: pending.factory,
            });

            for method in &service.info.methods {
                let id = format!("{}.{}", service.info.name, method.name);
                let verb = conventions.verbs().classify(&method.name)?;
                let raw = conventions.paths().template_for(&service.prefix, method, verb);
                let template =
                    PathTemplate::parse(&raw).map_err(|e| ConfigurationError::InvalidTemplate {
                        operation: id.clone(),
                        template: raw.clone(),
                        reason: e.to_string(),
                    })?;
                let bindings = bind_parameters(&id, verb, &template, method, &mut shapes)?;
                let returns = shapes.intern(method.returns);

                router
                    .insert(verb.method(), template.clone(), candidates.len())
                    .map_err(|conflict| {
                        let first = candidates
                            .iter()
                            .find(|c| c.verb == verb && c.template == conflict.existing)
                            .map(|c| c.id.clone())
                            .unwrap_or_default();
                        ConfigurationError::AmbiguousOperation {
                            verb,
                            template: conflict.rejected.to_string(),
                            first,
                            second: id.clone(),
                        }
                    })?;

                tracing::debug!(
                    operation = %id,
                    verb = %verb,
                    path = %template,
                    "registered operation"
                );

                candidates.push(OperationCandidate {
                    id,
                    service: Arc::clone(&service),
                    method: method.clone(),
                    verb,
                    template,
                    bindings,
                    returns,
                });
            }
            services.push(service);
        }

        tracing::info!(
            services = services.len(),
            operations = candidates.len(),
            "service registry built"
        );

        Ok(ServiceRegistry {
            conventions,
            services,
            candidates,
            router,
            shapes,
        })
    }
}

fn normalize_prefix(prefix: &str) -> ConfigResult<String> {
    let invalid = |reason: &str| ConfigurationError::InvalidPathPrefix {
        prefix: prefix.to_string(),
        reason: reason.to_string(),
    };
    let template = PathTemplate::parse(prefix).map_err(|e| invalid(&e.to_string()))?;
    if template.placeholders().next().is_some() {
        return Err(invalid("prefixes cannot contain placeholders"));
    }
    Ok(if template.is_empty() {
        String::new()
    } else {
        template.to_string()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueClass {
    Scalar,
    ScalarList,
    Complex,
}

fn classify(info: &TypeInfo) -> ValueClass {
    match &info.kind {
        TypeKind::Optional(inner) => classify(&inner.resolve()),
        TypeKind::Scalar(_) | TypeKind::Enum(_) => ValueClass::Scalar,
        TypeKind::List(inner) => match classify(&inner.resolve()) {
            ValueClass::Scalar => ValueClass::ScalarList,
            _ => ValueClass::Complex,
        },
        _ => ValueClass::Complex,
    }
}

fn bind_parameters(
    operation: &str,
    verb: HttpVerb,
    template: &PathTemplate,
    method: &MethodInfo,
    shapes: &mut ShapeTable,
) -> ConfigResult<Vec<ParamBinding>> {
    if let Some(placeholder) = template
        .placeholders()
        .find(|p| !method.params.iter().any(|param| param.name == *p))
    {
        return Err(ConfigurationError::UnboundPathPlaceholder {
            operation: operation.to_string(),
            placeholder: placeholder.to_string(),
        });
    }

    let invalid = |param: &ParamInfo, source: ParamSource, reason: &str| {
        ConfigurationError::InvalidParameterSource {
            operation: operation.to_string(),
            parameter: param.name.clone(),
            source_kind: source,
            reason: reason.to_string(),
        }
    };

    let mut bindings = Vec::with_capacity(method.params.len());
    for param in &method.params {
        let info = param.ty.resolve();
        let class = classify(&info);
        let in_template = template.has_placeholder(&param.name);

        let source = match param.source {
            Some(ParamSource::Path) | None if in_template => {
                if class != ValueClass::Scalar {
                    return Err(invalid(param, ParamSource::Path, "path parameters must be scalar"));
                }
                ParamSource::Path
            }
            Some(ParamSource::Path) => {
                return Err(invalid(
                    param,
                    ParamSource::Path,
                    "no matching placeholder in the path template",
                ));
            }
            Some(source) if in_template => {
                return Err(invalid(param, source, "the name is claimed by a path placeholder"));
            }
            Some(ParamSource::Query) if class == ValueClass::Complex => {
                return Err(invalid(
                    param,
                    ParamSource::Query,
                    "query parameters must be scalars or collections of scalars",
                ));
            }
            Some(source) => source,
            None if class == ValueClass::Complex => ParamSource::Body,
            None => ParamSource::Query,
        };

        let optional = info.kind.is_optional();
        let required = match source {
            ParamSource::Path => true,
            ParamSource::Query => !optional && class != ValueClass::ScalarList,
            ParamSource::Body => !optional,
        };

        bindings.push(ParamBinding {
            param: param.clone(),
            source,
            shape: shapes.intern(param.ty),
            required,
            collection: class == ValueClass::ScalarList,
        });
    }

    let bodies: Vec<String> = bindings
        .iter()
        .filter(|b| b.source == ParamSource::Body)
        .map(|b| b.param.name.clone())
        .collect();
    if bodies.len() > 1 {
        return Err(ConfigurationError::MultipleBodyParameters {
            operation: operation.to_string(),
            parameters: bodies,
        });
    }
    if verb == HttpVerb::Get && !bodies.is_empty() {
        tracing::warn!(operation = %operation, "GET operation reads a request body");
    }

    Ok(bindings)
}
