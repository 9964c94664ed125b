//! Entry point
//!
//! [`Core`] turns inputs into collections and owns everything collections
//! share: the parser, the printer, the plugin registry and the method table.
//! It is a cheap handle; clones refer to the same core.
//!
//! Most callers use the process-wide default through [`wrap`] and
//! [`use_plugin`]. Independent cores (other languages, printer settings, or
//! an isolated plugin set for a test) come from [`Core::new`].

use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};
use treeshift_ast::{DiffPrinter, Node, Parser, Printer, TreeSitterParser};

use crate::core::collection::Collection;
use crate::core::config::CoreConfig;
use crate::core::error::{CoreError, Result};
use crate::core::input::{normalize, Input};
use crate::core::methods::{MethodOutput, MethodTable};
use crate::core::registry::{PluginFn, PluginKey, PluginRegistry};

struct CoreInner {
    config: CoreConfig,
    parser: Box<dyn Parser>,
    printer: Box<dyn Printer>,
    registry: PluginRegistry,
    methods: MethodTable,
}

/// Entry point and shared state for collections
#[derive(Clone)]
pub struct Core {
    inner: Arc<CoreInner>,
}

impl Core {
    /// Build a core with the tree-sitter parser and diff-aware printer
    /// described by `config`
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        let parser = TreeSitterParser::new(config.language)?.allow_errors(config.allow_parse_errors);
        let printer = DiffPrinter::new(config.print.clone());
        Ok(Self::with_collaborators(config, Box::new(parser), Box::new(printer)))
    }

    /// Build a core around caller-supplied collaborators
    pub fn with_collaborators(
        config: CoreConfig,
        parser: Box<dyn Parser>,
        printer: Box<dyn Printer>,
    ) -> Self {
        tracing::debug!(language = parser.language().name(), "creating core");
        Self {
            inner: Arc::new(CoreInner {
                config,
                parser,
                printer,
                registry: PluginRegistry::new(),
                methods: MethodTable::new(),
            }),
        }
    }

    /// JavaScript core with default settings
    pub fn javascript() -> Self {
        Self::with_collaborators(
            CoreConfig::default(),
            Box::new(TreeSitterParser::javascript()),
            Box::new(DiffPrinter::default()),
        )
    }

    /// Normalize `input` into a collection bound to this core.
    ///
    /// Source text is parsed with this core's parser; parse failures are
    /// returned as they are.
    pub fn wrap<I: Into<Input>>(&self, input: I) -> Result<Collection> {
        let paths = normalize(input.into(), self.parser())?;
        Ok(Collection::new(paths, self))
    }

    /// Parse source text without wrapping it
    pub fn parse(&self, source: &str) -> Result<Node> {
        Ok(self.parser().parse(source)?)
    }

    /// Apply `plugin` to this core unless it was applied before.
    ///
    /// The plugin is recorded before it runs, so a plugin that registers
    /// itself again (directly or through another plugin) is not re-entered.
    /// A plugin that fails stays recorded and is not retried.
    pub fn use_plugin(&self, plugin: PluginFn) -> Result<&Self> {
        let key = PluginKey::of(plugin);
        if !self.inner.registry.record(key) {
            tracing::debug!(?key, "plugin already registered, skipping");
            return Ok(self);
        }

        tracing::debug!(?key, "applying plugin");
        plugin(self).map_err(|err| {
            tracing::debug!(?key, error = %err, "plugin setup failed");
            CoreError::Plugin(err)
        })?;
        Ok(self)
    }

    /// Forget every applied plugin and every installed method.
    ///
    /// Collections already created see the empty method table.
    pub fn reset(&self) {
        tracing::debug!("resetting plugins and methods");
        self.inner.registry.reset();
        self.inner.methods.clear();
    }

    /// Install a collection method on this core
    pub fn install<F>(&self, name: &str, method: F) -> Result<()>
    where
        F: Fn(&Collection, &[Value]) -> anyhow::Result<MethodOutput> + Send + Sync + 'static,
    {
        self.inner.methods.install(name, Arc::new(method))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    pub fn parser(&self) -> &dyn Parser {
        self.inner.parser.as_ref()
    }

    pub fn printer(&self) -> &dyn Printer {
        self.inner.printer.as_ref()
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.inner.registry
    }

    pub fn methods(&self) -> &MethodTable {
        &self.inner.methods
    }

    /// Whether two handles refer to the same core
    pub fn ptr_eq(a: &Core, b: &Core) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl Default for Core {
    fn default() -> Self {
        Self::javascript()
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("language", &self.parser().language())
            .field("plugins", &self.inner.registry.len())
            .field("methods", &self.inner.methods)
            .finish()
    }
}

// ============================================================================
// Process-wide default
// ============================================================================

static GLOBAL_CORE: OnceLock<Core> = OnceLock::new();

/// The process-wide default core (JavaScript, default settings)
pub fn global_core() -> &'static Core {
    GLOBAL_CORE.get_or_init(Core::javascript)
}

/// Wrap `input` with the process-wide default core
pub fn wrap<I: Into<Input>>(input: I) -> Result<Collection> {
    global_core().wrap(input)
}

/// Apply `plugin` to the process-wide default core
pub fn use_plugin(plugin: PluginFn) -> Result<&'static Core> {
    global_core().use_plugin(plugin)
}
