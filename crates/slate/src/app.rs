//! The assembled application.
//!
//! [`SlateBuilder`] turns a [`SlateConfig`] plus registered services into a
//! [`Slate`]: one shared [`ServiceRegistry`] read by both the [`Dispatcher`]
//! and the [`ApiDescription`]. Building fails on any inconsistency, so a
//! `Slate` that exists dispatches exactly what it documents.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use slate_config::{DocsConfig, SlateConfig};
use slate_core::{
    Conventions, DocumentationProvider, RegistryBuilder, Serializer, ServiceFactory, ServiceInfo,
    ServiceRegistry, TagProvider, TypeNameProvider, WebService,
};
use slate_docs::{ApiDescription, OpenApi, OpenApiGenerator};
use slate_server::Dispatcher;

use crate::SlateResult;

/// A built API: registry, dispatcher and description.
///
/// # Example
///
/// ```rust,ignore
/// use slate::prelude::*;
///
/// let slate = Slate::builder()
///     .register("/path", || Things)
///     .build()?;
///
/// let response = slate.handle(request);
/// let json = slate.openapi_json()?;
/// ```
pub struct Slate {
    config: SlateConfig,
    registry: Arc<ServiceRegistry>,
    dispatcher: Dispatcher,
    description: ApiDescription,
    generator: OpenApiGenerator,
}

impl Slate {
    /// Starts a builder with the default configuration.
    pub fn builder() -> SlateBuilder {
        SlateBuilder::new()
    }

    /// Returns the configuration this API was built from.
    pub fn config(&self) -> &SlateConfig {
        &self.config
    }

    /// Returns the shared operation table.
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatches one request.
    pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        self.dispatcher.handle(request)
    }

    /// Returns the format-neutral description.
    pub fn description(&self) -> &ApiDescription {
        &self.description
    }

    /// Renders the OpenAPI document.
    pub fn openapi(&self) -> SlateResult<OpenApi> {
        Ok(self.generator.generate(&self.description)?)
    }

    /// Renders the OpenAPI document as pretty-printed JSON.
    pub fn openapi_json(&self) -> SlateResult<String> {
        Ok(self.generator.generate_json(&self.description)?)
    }
}

impl fmt::Debug for Slate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slate")
            .field("registry", &self.registry)
            .field("operations", &self.description.operations.len())
            .field("schemas", &self.description.schemas.len())
            .finish_non_exhaustive()
    }
}

struct PendingService {
    prefix: String,
    info: ServiceInfo,
    factory: ServiceFactory,
}

/// Builder for [`Slate`].
///
/// Providers set here take precedence over the ones derived from the
/// configuration's `naming` section.
pub struct SlateBuilder {
    config: SlateConfig,
    documentation: Option<DocumentationProvider>,
    type_names: Option<TypeNameProvider>,
    tags: Option<TagProvider>,
    serializer: Option<Arc<dyn Serializer>>,
    install_logging: bool,
    services: Vec<PendingService>,
}

impl Default for SlateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SlateBuilder {
    /// Creates a builder with [`SlateConfig::default`].
    pub fn new() -> Self {
        Self::from_config(SlateConfig::default())
    }

    /// Creates a builder from a loaded configuration.
    pub fn from_config(config: SlateConfig) -> Self {
        Self {
            config,
            documentation: None,
            type_names: None,
            tags: None,
            serializer: None,
            install_logging: false,
            services: Vec::new(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: SlateConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the documentation provider.
    #[must_use]
    pub fn documentation(mut self, documentation: DocumentationProvider) -> Self {
        self.documentation = Some(documentation);
        self
    }

    /// Sets the schema type name provider.
    #[must_use]
    pub fn type_names(mut self, type_names: TypeNameProvider) -> Self {
        self.type_names = Some(type_names);
        self
    }

    /// Sets the tag provider.
    #[must_use]
    pub fn tags(mut self, tags: TagProvider) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Uses a custom serializer instead of `JsonSerializer` with the
    /// configured options.
    #[must_use]
    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Installs the global `tracing` subscriber from the `logging` section
    /// during [`build`](Self::build).
    #[must_use]
    pub fn install_logging(mut self, install: bool) -> Self {
        self.install_logging = install;
        self
    }

    /// Registers service `S` under `prefix`. `factory` runs once per request.
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
        self.services.push(PendingService {
            prefix: prefix.into(),
            info,
            factory,
        });
        self
    }

    /// Validates the configuration, builds the registry and assembles the
    /// description.
    ///
    /// # Errors
    ///
    /// Returns [`SlateError`](crate::SlateError) for invalid configuration,
    /// any registry inconsistency or a schema name collision.
    pub fn build(self) -> SlateResult<Slate> {
        let Self {
            config,
            documentation,
            type_names,
            tags,
            serializer,
            install_logging,
            services,
        } = self;

        config.validate()?;
        if install_logging {
            slate_telemetry::init_logging(&config.logging)?;
        }

        let naming = &config.naming;
        let tags = match tags {
            Some(tags) => tags,
            None => naming.tag_provider()?,
        };
        let mut conventions = Conventions::builder()
            .verb_patterns(config.verbs.patterns())
            .paths(naming.path_convention())
            .serializer_options(config.serializer)
            .type_names(type_names.unwrap_or_else(|| naming.type_name_provider()))
            .tags(tags);
        if let Some(serializer) = serializer {
            conventions = conventions.serializer(serializer);
        }
        if let Some(documentation) = documentation {
            conventions = conventions.documentation(documentation);
        }

        let registry = services
            .into_iter()
            .fold(RegistryBuilder::new(conventions.build()?), |builder, s| {
                builder.register_dyn(s.prefix, s.info, s.factory)
            })
            .build()?;
        let registry = Arc::new(registry);

        let description = ApiDescription::assemble(&registry)?;
        let generator = generator(&config.docs);
        // Surface reserved-name collisions now rather than on first render.
        generator.generate(&description)?;

        let dispatcher = Dispatcher::new(Arc::clone(&registry))
            .with_max_body_bytes(config.dispatch.max_body_bytes);

        tracing::info!(
            services = registry.services().len(),
            operations = description.operations.len(),
            schemas = description.schemas.len(),
            "slate built"
        );

        Ok(Slate {
            config,
            registry,
            dispatcher,
            description,
            generator,
        })
    }
}

fn generator(docs: &DocsConfig) -> OpenApiGenerator {
    let mut generator = OpenApiGenerator::new()
        .title(docs.title.clone())
        .version(docs.version.clone());
    if let Some(description) = &docs.description {
        generator = generator.description(description.clone());
    }
    docs.servers.iter().fold(generator, |generator, server| {
        generator.server(server.url.clone(), server.description.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_config::ServerConfig;
    use slate_core::{output, Arguments, MethodInfo, ServiceError, TypeRef, Value};

    struct Health;

    impl WebService for Health {
        fn service_info() -> ServiceInfo {
            ServiceInfo::new("Health")
                .method(MethodInfo::new("get_status").returns(TypeRef::of::<String>()))
        }

        fn invoke(&self, method: &str, _args: Arguments) -> Result<Value, ServiceError> {
            match method {
                "get_status" => output::from_value(&"ok"),
                _ => Err(ServiceError::unknown_method(method)),
            }
        }
    }

    #[test]
    fn test_generator_from_docs_config() {
        let docs = DocsConfig {
            title: "Things".to_string(),
            version: "2.0.0".to_string(),
            description: Some("All the things".to_string()),
            servers: vec![ServerConfig {
                url: "https://api.example.com".to_string(),
                description: None,
            }],
        };
        let slate = Slate::builder().register("/health", || Health).build().unwrap();
        let spec = generator(&docs).generate(slate.description()).unwrap();

        assert_eq!(spec.info.title, "Things");
        assert_eq!(spec.info.version, "2.0.0");
        assert_eq!(spec.info.description.as_deref(), Some("All the things"));
        assert_eq!(spec.servers[0].url, "https://api.example.com");
    }

    #[test]
    fn test_build_wires_config() {
        let mut config = SlateConfig::default();
        config.dispatch.max_body_bytes = 16;

        let slate = SlateBuilder::from_config(config)
            .register("/health", || Health)
            .build()
            .unwrap();

        assert_eq!(slate.dispatcher().max_body_bytes(), 16);
        assert_eq!(slate.registry().candidates().len(), 1);
        assert!(slate.description().operation("Health.get_status").is_some());
        assert!(format!("{slate:?}").contains("operations: 1"));
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let mut config = SlateConfig::default();
        config.dispatch.max_body_bytes = 0;
        let err = SlateBuilder::from_config(config).build().unwrap_err();
        assert!(matches!(err, crate::SlateError::Config(_)));
    }
}
