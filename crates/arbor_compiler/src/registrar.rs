//! Registration entry point.
//!
//! A [`Registrar`] holds everything shared between registrations (global
//! variables, the type registry, loaders, a syntax sink and settings) and
//! turns a handler [`Object`] into a command on a [`Dispatcher`]:
//!
//! 1. obtain the input (inline text, `file = <path>`, or a file handle)
//! 2. expand preprocessor directives
//! 3. lex and parse
//! 4. compile against the handler
//! 5. register the tree, or fail with the whole diagnostic report
//!
//! The dispatcher is only touched when every step succeeded.

use std::fmt;
use std::sync::Arc;

use arbor_dispatch::{CommandNode, Dispatcher};
use arbor_foundation::{Error, ErrorKind, Result, Value};
use arbor_language::{format_error, parse};
use tracing::{debug, warn};

use crate::compiler::{self, FAILED};
use crate::context::CompileContext;
use crate::diagnostics::{Diagnostics, Severity};
use crate::loader::{Loader, Loaders};
use crate::options::RegistrarOptions;
use crate::preprocess::preprocess;
use crate::reflect::{CommandInput, Object};
use crate::syntax::{SyntaxEntry, SyntaxSink};
use crate::types::TypeRegistry;
use crate::variables::Variables;

#[derive(Clone)]
enum Types {
    Global,
    Owned(Arc<TypeRegistry>),
}

/// A compiled command that has not been registered yet.
#[derive(Debug)]
pub struct Registration {
    /// The command tree.
    pub node: CommandNode,
    /// Usage lines of every described node.
    pub syntax: Vec<SyntaxEntry>,
    /// Warnings raised while compiling. Never contains errors.
    pub diagnostics: Diagnostics,
}

/// Compiles handler objects and registers their commands.
#[derive(Clone)]
pub struct Registrar {
    variables: Variables,
    types: Types,
    loaders: Loaders,
    sink: Option<Arc<dyn SyntaxSink>>,
    options: RegistrarOptions,
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("variables", &self.variables.len())
            .field("loaders", &self.loaders.len())
            .field("sink", &self.sink.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Registrar {
    /// A registrar using [`TypeRegistry::global`], with no variables,
    /// loaders or sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variables: Variables::new(),
            types: Types::Global,
            loaders: Loaders::new(),
            sink: None,
            options: RegistrarOptions::default(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replaces the settings.
    #[must_use]
    pub fn with_options(mut self, options: RegistrarOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses `types` instead of the global registry.
    #[must_use]
    pub fn with_types(mut self, types: Arc<TypeRegistry>) -> Self {
        self.types = Types::Owned(types);
        self
    }

    /// Adds a loader after the existing ones.
    #[must_use]
    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.add_loader(loader);
        self
    }

    /// Sets the sink receiving usage lines after each registration.
    #[must_use]
    pub fn with_syntax_sink(mut self, sink: Arc<dyn SyntaxSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Binds a variable shared by every registration.
    ///
    /// # Errors
    /// Fails if `key` is not identifier-shaped.
    pub fn with_variable(mut self, key: &str, value: impl Into<Value>) -> Result<Self> {
        self.variables.insert(key, value)?;
        Ok(self)
    }

    /// Adds a loader after the existing ones.
    pub fn add_loader(&mut self, loader: impl Loader + 'static) {
        self.loaders.push(loader);
    }

    /// Shared variables.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Shared variables, for adding bindings.
    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// The type registry in use.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        match &self.types {
            Types::Global => TypeRegistry::global(),
            Types::Owned(types) => types,
        }
    }

    /// The settings.
    #[must_use]
    pub fn options(&self) -> &RegistrarOptions {
        &self.options
    }

    /// The settings, for editing.
    pub fn options_mut(&mut self) -> &mut RegistrarOptions {
        &mut self.options
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Compiles `handler` and adds its command to `dispatcher`.
    ///
    /// # Errors
    /// Fails with an input, parse or compilation error; `dispatcher` is
    /// left untouched.
    pub fn register(&self, handler: &Object, dispatcher: &mut Dispatcher) -> Result<Arc<CommandNode>> {
        let compiled = self.compile(handler)?;
        let node = dispatcher.register(compiled.node);
        if let Some(sink) = &self.sink {
            for entry in compiled.syntax {
                sink.accept(entry);
            }
        }
        debug!(command = node.name(), class = handler.class().name(), "registered handler");
        Ok(node)
    }

    /// Compiles `handler` without registering it.
    ///
    /// # Errors
    /// Fails with an input, parse or compilation error.
    pub fn compile(&self, handler: &Object) -> Result<Registration> {
        let class = handler.class();
        let input = self.input(handler)?;
        debug!(class = class.name(), bytes = input.len(), "read command input");

        let root = parse(&input, &self.options.parse_options())?;
        debug!(class = class.name(), nodes = root.node_count(), "parsed command tree");

        let mut local = Variables::new();
        handler.init_variables(&mut local)?;
        let variables = self.variables.merged(&local);

        let mut context = CompileContext::new(&variables, self.types(), handler, &self.options);
        let node = compiler::compile(&root, &mut context);
        let (diagnostics, usages) = context.finish();

        let name = if node.name() == FAILED {
            class.name().to_string()
        } else {
            node.name().to_string()
        };

        let errors = diagnostics.error_count();
        let warnings = diagnostics.warning_count();
        if errors > 0 || (self.options.fail_on_warnings && warnings > 0) {
            return Err(Error::new(ErrorKind::Compilation {
                report: diagnostics.render(&input, &name),
                command: name,
                errors,
                warnings,
            }));
        }
        if warnings > 0 && self.options.warnings_enabled {
            for entry in diagnostics.entries() {
                if entry.severity == Severity::Warning {
                    warn!(command = %name, "{}", entry.format(&input));
                }
            }
        }

        let syntax = usages
            .into_iter()
            .map(|usage| SyntaxEntry {
                command: name.clone(),
                class: class.name().to_string(),
                usage: usage.usage,
                description: usage.description,
                condition: usage.condition,
            })
            .collect();

        Ok(Registration {
            node,
            syntax,
            diagnostics,
        })
    }

    /// The preprocessed command text of `handler`.
    ///
    /// # Errors
    /// Fails if the handler declares no input, a `file =` header is
    /// malformed, no loader has the file, or a directive fails.
    pub fn input(&self, handler: &Object) -> Result<String> {
        let class = handler.class();
        let input_error = |message: String| {
            Error::new(ErrorKind::Input {
                command: class.name().to_string(),
                message,
            })
        };

        let text = match class.input() {
            None => return Err(input_error("No command data or command file set".into())),
            Some(CommandInput::Data(data)) => self.read_data(data).map_err(input_error)?,
            Some(CommandInput::File(path)) => {
                if path.is_empty() {
                    return Err(input_error("No file path set".into()));
                }
                self.loaders
                    .find(path, 0)
                    .map_err(|f| input_error(format_error(path, f.position, &f.message)))?
            }
        };

        preprocess(&text, &self.loaders)
            .map_err(|f| input_error(format_error(&text, f.position, &f.message)))
    }

    fn read_data(&self, data: &str) -> std::result::Result<String, String> {
        if data.is_empty() {
            return Err("Empty input".into());
        }
        let Some(rest) = data
            .strip_prefix("file")
            .filter(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        else {
            return Ok(data.to_string());
        };
        let offset = data.len() - rest.len();
        let trimmed = rest.trim_start();
        let cursor = offset + (rest.len() - trimmed.len());
        let Some(after_eq) = trimmed.strip_prefix('=') else {
            return Err(format_error(
                data,
                Some(cursor),
                "'file' token must be proceeded by '=' token",
            ));
        };
        let path = after_eq.trim_start();
        let start = data.len() - path.len();
        let path = path.trim_end();
        self.loaders
            .find(path, start)
            .map_err(|f| format_error(data, f.position, &f.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use crate::reflect::{ClassBuilder, Param};
    use crate::syntax::SyntaxCollector;
    use arbor_dispatch::{BasicSource, Command};
    use arbor_foundation::Type;

    struct Handler;

    fn handler(builder: ClassBuilder<Handler>) -> Object {
        let class = builder
            .method("run", vec![Param::source()], Type::Int, |_, _| Ok(Value::Int(1)))
            .build();
        Object::new(class, Handler)
    }

    fn inline(data: &str) -> Object {
        handler(ClassBuilder::new("Inline").command_data(data))
    }

    #[test]
    fn registers_inline_commands() {
        let mut dispatcher = Dispatcher::new();
        let node = Registrar::new()
            .register(&inline("name = 'greet'\nexecutes = run()"), &mut dispatcher)
            .unwrap();
        assert_eq!(node.name(), "greet");
        assert_eq!(dispatcher.execute("greet", BasicSource::new("a").shared()).unwrap(), 1);
    }

    #[test]
    fn missing_input_is_an_input_error() {
        let err = Registrar::new()
            .compile(&handler(ClassBuilder::new("Bare")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error getting command input for Bare: No command data or command file set"
        );
        let err = Registrar::new().compile(&inline("")).unwrap_err();
        assert!(err.to_string().ends_with("Empty input"));
    }

    #[test]
    fn file_header_loads_through_loaders() {
        let registrar = Registrar::new().with_loader(
            MemoryLoader::new().with("cmds/greet.cmd", "name = 'greet'\nexecutes = run()"),
        );
        let compiled = registrar.compile(&inline("file = cmds/greet.cmd\n")).unwrap();
        assert_eq!(compiled.node.name(), "greet");

        let err = registrar.compile(&inline("file cmds/greet.cmd")).unwrap_err();
        assert!(err.to_string().contains("'file' token must be proceeded by '=' token"));

        let err = registrar.compile(&inline("file = other.cmd")).unwrap_err();
        assert!(err.to_string().contains("No valid loader path 'other.cmd' found"));
    }

    #[test]
    fn command_file_handles() {
        let registrar = Registrar::new()
            .with_loader(MemoryLoader::new().with("ban.cmd", "name = 'ban'\nexecutes = run()"));
        let object = handler(ClassBuilder::new("Ban").command_file("ban.cmd"));
        assert_eq!(registrar.compile(&object).unwrap().node.name(), "ban");
    }

    #[test]
    fn compile_errors_leave_the_dispatcher_alone() {
        let mut dispatcher = Dispatcher::new();
        let err = Registrar::new()
            .register(&inline("name = 'a'\nexecutes = missing()"), &mut dispatcher)
            .unwrap_err();
        match err.kind {
            ErrorKind::Compilation { command, errors, report, .. } => {
                assert_eq!(command, "a");
                assert_eq!(errors, 1);
                assert!(report.starts_with(
                    "Errors/Warnings during compilation of command 'a' (1 total warnings/errors)"
                ));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(dispatcher.names().count(), 0);
    }

    #[test]
    fn failed_names_report_the_class() {
        let err = Registrar::new().compile(&inline("name = @missing")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Compilation { ref command, .. } if command == "Inline"));
    }

    #[test]
    fn warnings_can_be_fatal() {
        let data = "name = 'a'\nliteral('b') { map_result('ghost') = @m\nexecutes = run() }";
        let object = inline(data);
        let registrar = Registrar::new()
            .with_variable("m", Value::native(arbor_dispatch::ArgumentModifier::new(|_, v| Ok(v))))
            .unwrap();
        let compiled = registrar.compile(&object).unwrap();
        assert_eq!(compiled.diagnostics.warning_count(), 1);

        let strict = registrar.with_options(RegistrarOptions::default().with_fail_on_warnings(true));
        assert!(strict.compile(&object).is_err());
    }

    #[test]
    fn local_variables_override_shared_ones() {
        let object = handler(
            ClassBuilder::new("Local")
                .command_data("name = @title\nexecutes = @action")
                .variables(|_, vars| {
                    vars.insert("title", "local")?;
                    vars.insert("action", Value::native(Command::new(|_| Ok(5))))
                }),
        );
        let registrar = Registrar::new().with_variable("title", "shared").unwrap();
        let mut dispatcher = Dispatcher::new();
        registrar.register(&object, &mut dispatcher).unwrap();
        assert_eq!(dispatcher.execute("local", BasicSource::new("a").shared()).unwrap(), 5);
    }

    #[test]
    fn syntax_goes_to_the_sink() {
        let sink = Arc::new(SyntaxCollector::new());
        let registrar = Registrar::new().with_syntax_sink(sink.clone());
        let object = inline(
            "name = 'warp'\n\
             argument('place', word) { description = 'Warps somewhere'\nexecutes = run() }",
        );
        registrar.register(&object, &mut Dispatcher::new()).unwrap();
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].to_string(), "/warp <place> - Warps somewhere");
        assert_eq!(entries[0].class, "Inline");
    }
}
