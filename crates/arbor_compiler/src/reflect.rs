//! Runtime descriptions of handler objects.
//!
//! A command tree names fields and methods of its handler (`executes =
//! run()`, `requires = settings.canUse()`). Rust has no runtime
//! reflection, so handlers describe themselves: a [`ClassBuilder`] registers
//! each member as a typed closure together with its declared [`Type`] and,
//! for methods, its [`Param`]s. The compiler validates member references
//! against the resulting [`Class`] and invokes them through an [`Object`].
//!
//! ```
//! use arbor_compiler::reflect::{ClassBuilder, Object, Param};
//! use arbor_foundation::{Type, Value};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let class = ClassBuilder::<Greeter>::new("Greeter")
//!     .command_data("name = 'greet'\nexecutes = greet()")
//!     .field("greeting", Type::String, |g| Value::from(g.greeting.as_str()))
//!     .method("greet", vec![Param::source()], Type::Int, |g, args| {
//!         args.source(0)?.send_message(&g.greeting.as_str().into());
//!         Ok(Value::Int(1))
//!     })
//!     .build();
//!
//! let handler = Object::new(class, Greeter { greeting: "hi".into() });
//! assert_eq!(handler.get("greeting").unwrap(), Value::from("hi"));
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use arbor_dispatch::{CommandContext, CommandSource, NodeBuilder, SharedSource, SuggestionsBuilder};
use arbor_foundation::{Error, NativeType, Result, Type, Value};

use crate::variables::Variables;

/// Declared type of command-source parameters.
pub const SOURCE_TYPE: Type = Type::Native(SourceRef::TYPE_NAME);
/// Declared type of command-context parameters.
pub const CONTEXT_TYPE: Type = Type::Native("CommandContext");
/// Declared type of suggestions-builder parameters.
pub const SUGGESTIONS_BUILDER_TYPE: Type = Type::Native("SuggestionsBuilder");
/// Declared type of node-builder parameters (transform methods).
pub const NODE_BUILDER_TYPE: Type = Type::Native("NodeBuilder");
/// Declared return type of suggestion methods.
pub const SUGGESTIONS_TYPE: Type = Type::Native("Suggestions");
/// Declared type of object-valued members.
pub const OBJECT_TYPE: Type = Type::Native(Object::TYPE_NAME);

type Instance = dyn Any + Send + Sync;
type Getter = Arc<dyn Fn(&Instance) -> Result<Value> + Send + Sync>;
type Invoker = Arc<dyn Fn(&Instance, &mut Args<'_>) -> Result<Value> + Send + Sync>;
type Initializer = Arc<dyn Fn(&Instance, &mut Variables) -> Result<()> + Send + Sync>;

// =============================================================================
// Command input
// =============================================================================

/// Where a handler's command source text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandInput {
    /// The grammar text itself. `file = <path>` defers to the loaders.
    Data(String),
    /// A path handed to the loaders.
    File(String),
}

// =============================================================================
// Members
// =============================================================================

/// A readable field.
pub struct Field {
    name: String,
    ty: Type,
    mutable: bool,
    class: Option<Arc<Class>>,
    get: Getter,
}

impl Field {
    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns true if the value may change after registration.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// The class of the field's value, for object-valued fields.
    #[must_use]
    pub fn class(&self) -> Option<&Arc<Class>> {
        self.class.as_ref()
    }

    /// Reads the field from `object`.
    ///
    /// # Errors
    /// Fails if `object` is not an instance of the declaring class.
    pub fn get(&self, object: &Object) -> Result<Value> {
        (self.get)(&*object.instance)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// Binds a parameter to an argument other than its own name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgumentBinding {
    /// Argument name.
    pub name: String,
    /// If true, a missing argument is passed as nil.
    pub optional: bool,
}

/// What a parameter receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// The command source.
    Source,
    /// The command context.
    Context,
    /// The suggestions builder.
    SuggestionsBuilder,
    /// The node builder.
    NodeBuilder,
    /// An argument value.
    Value,
}

/// A method parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    name: Option<String>,
    ty: Type,
    binding: Option<ArgumentBinding>,
}

impl Param {
    /// A parameter filled from the argument called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            binding: None,
        }
    }

    /// A parameter whose name was not recorded.
    #[must_use]
    pub fn unnamed(ty: Type) -> Self {
        Self {
            name: None,
            ty,
            binding: None,
        }
    }

    /// The command source.
    #[must_use]
    pub fn source() -> Self {
        Self::new("source", SOURCE_TYPE)
    }

    /// The command context.
    #[must_use]
    pub fn context() -> Self {
        Self::new("context", CONTEXT_TYPE)
    }

    /// The suggestions builder.
    #[must_use]
    pub fn suggestions() -> Self {
        Self::new("builder", SUGGESTIONS_BUILDER_TYPE)
    }

    /// The node builder.
    #[must_use]
    pub fn node_builder() -> Self {
        Self::new("builder", NODE_BUILDER_TYPE)
    }

    /// Fills this parameter from argument `name` instead.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>) -> Self {
        self.binding = Some(ArgumentBinding {
            name: name.into(),
            optional: false,
        });
        self
    }

    /// Fills this parameter from argument `name`, or nil when absent.
    #[must_use]
    pub fn optional_argument(mut self, name: impl Into<String>) -> Self {
        self.binding = Some(ArgumentBinding {
            name: name.into(),
            optional: true,
        });
        self
    }

    /// The declared parameter name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The declared type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The explicit argument binding.
    #[must_use]
    pub fn binding(&self) -> Option<&ArgumentBinding> {
        self.binding.as_ref()
    }

    /// Classifies the parameter by its declared type.
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        match self.ty {
            Type::Native(SourceRef::TYPE_NAME) => ParamKind::Source,
            Type::Native("CommandContext") => ParamKind::Context,
            Type::Native("SuggestionsBuilder") => ParamKind::SuggestionsBuilder,
            Type::Native("NodeBuilder") => ParamKind::NodeBuilder,
            _ => ParamKind::Value,
        }
    }
}

/// A callable method.
pub struct Method {
    name: String,
    params: Vec<Param>,
    returns: Type,
    class: Option<Arc<Class>>,
    call: Invoker,
}

impl Method {
    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Declared return type. [`Type::Nil`] means nothing is returned.
    #[must_use]
    pub fn returns(&self) -> &Type {
        &self.returns
    }

    /// Returns true if the method returns nothing.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.returns.is_nil()
    }

    /// The class of the returned object, for object-returning methods.
    #[must_use]
    pub fn class(&self) -> Option<&Arc<Class>> {
        self.class.as_ref()
    }

    /// Returns true if the parameter types are exactly `types`.
    #[must_use]
    pub fn has_param_types(&self, types: &[Type]) -> bool {
        self.params.len() == types.len()
            && self.params.iter().zip(types).all(|(p, t)| &p.ty == t)
    }

    /// Invokes the method on `object`.
    ///
    /// # Errors
    /// Fails if `object` is not an instance of the declaring class or the
    /// method itself fails.
    pub fn invoke(&self, object: &Object, args: &mut Args<'_>) -> Result<Value> {
        (self.call)(&*object.instance, args)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param.ty)?;
        }
        write!(f, ") -> {}", self.returns)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// =============================================================================
// Class
// =============================================================================

/// The members of a handler type.
pub struct Class {
    name: String,
    fields: Vec<Arc<Field>>,
    methods: Vec<Arc<Method>>,
    input: Option<CommandInput>,
    variables: Option<Initializer>,
}

impl Class {
    /// The class name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All methods called `name`, in registration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<Method>> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// The method called `name` with exactly these parameter types.
    #[must_use]
    pub fn method_with<'a>(&'a self, name: &'a str, types: &[Type]) -> Option<&'a Arc<Method>> {
        self.methods_named(name).find(|m| m.has_param_types(types))
    }

    /// Where this handler's command text comes from.
    #[must_use]
    pub fn input(&self) -> Option<&CommandInput> {
        self.input.as_ref()
    }

    /// Fields, in registration order.
    #[must_use]
    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    /// Methods, in registration order.
    #[must_use]
    pub fn methods(&self) -> &[Arc<Method>] {
        &self.methods
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

fn receiver<'a, T: 'static>(instance: &'a Instance, class: &str) -> Result<&'a T> {
    instance
        .downcast_ref::<T>()
        .ok_or_else(|| Error::reflection(format!("Receiver is not an instance of {class}")))
}

/// Describes the members of `T`.
pub struct ClassBuilder<T> {
    class: Class,
    marker: PhantomData<fn(&T)>,
}

impl<T: Send + Sync + 'static> ClassBuilder<T> {
    /// Starts a class called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: Class {
                name: name.into(),
                fields: Vec::new(),
                methods: Vec::new(),
                input: None,
                variables: None,
            },
            marker: PhantomData,
        }
    }

    /// Uses `data` as the command text.
    #[must_use]
    pub fn command_data(mut self, data: impl Into<String>) -> Self {
        self.class.input = Some(CommandInput::Data(data.into()));
        self
    }

    /// Loads the command text from `path`.
    #[must_use]
    pub fn command_file(mut self, path: impl Into<String>) -> Self {
        self.class.input = Some(CommandInput::File(path.into()));
        self
    }

    fn push_field(
        mut self,
        name: String,
        ty: Type,
        mutable: bool,
        class: Option<Arc<Class>>,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        let owner = self.class.name.clone();
        self.class.fields.push(Arc::new(Field {
            name,
            ty,
            mutable,
            class,
            get: Arc::new(move |instance| Ok(get(receiver::<T>(instance, &owner)?))),
        }));
        self
    }

    /// Adds an immutable field.
    #[must_use]
    pub fn field(
        self,
        name: impl Into<String>,
        ty: Type,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.push_field(name.into(), ty, false, None, get)
    }

    /// Adds a field whose value may change after registration.
    #[must_use]
    pub fn mutable_field(
        self,
        name: impl Into<String>,
        ty: Type,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.push_field(name.into(), ty, true, None, get)
    }

    /// Adds an immutable field holding an object of `class`.
    #[must_use]
    pub fn object_field(
        self,
        name: impl Into<String>,
        class: Arc<Class>,
        get: impl Fn(&T) -> Object + Send + Sync + 'static,
    ) -> Self {
        self.push_field(name.into(), OBJECT_TYPE, false, Some(class), move |t| {
            Value::native(get(t))
        })
    }

    /// Adds a method.
    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        params: Vec<Param>,
        returns: Type,
        call: impl Fn(&T, &mut Args<'_>) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        let owner = self.class.name.clone();
        self.class.methods.push(Arc::new(Method {
            name: name.into(),
            params,
            returns,
            class: None,
            call: Arc::new(move |instance, args| call(receiver::<T>(instance, &owner)?, args)),
        }));
        self
    }

    /// Adds a parameterless method returning an object of `class`.
    #[must_use]
    pub fn object_method(
        mut self,
        name: impl Into<String>,
        class: Arc<Class>,
        call: impl Fn(&T) -> Result<Object> + Send + Sync + 'static,
    ) -> Self {
        let owner = self.class.name.clone();
        self.class.methods.push(Arc::new(Method {
            name: name.into(),
            params: Vec::new(),
            returns: OBJECT_TYPE,
            class: Some(class),
            call: Arc::new(move |instance, _| {
                call(receiver::<T>(instance, &owner)?).map(Value::native)
            }),
        }));
        self
    }

    /// Sets the handler-local variable initializer, run once per
    /// registration before compiling.
    #[must_use]
    pub fn variables(
        mut self,
        init: impl Fn(&T, &mut Variables) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        let owner = self.class.name.clone();
        self.class.variables = Some(Arc::new(move |instance, vars| {
            init(receiver::<T>(instance, &owner)?, vars)
        }));
        self
    }

    /// Finishes the class.
    #[must_use]
    pub fn build(self) -> Arc<Class> {
        Arc::new(self.class)
    }
}

// =============================================================================
// Object
// =============================================================================

/// A handler instance paired with its class.
#[derive(Clone)]
pub struct Object {
    class: Arc<Class>,
    instance: Arc<Instance>,
}

impl NativeType for Object {
    const TYPE_NAME: &'static str = "Object";
}

impl Object {
    /// Wraps `instance`.
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(class: Arc<Class>, instance: T) -> Self {
        Self {
            class,
            instance: Arc::new(instance),
        }
    }

    /// Wraps an already shared instance.
    #[must_use]
    pub fn from_arc<T: Send + Sync + 'static>(class: Arc<Class>, instance: Arc<T>) -> Self {
        Self { class, instance }
    }

    /// Extracts an object from a value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_native::<Self>().cloned()
    }

    /// The object's class.
    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Borrows the instance as `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }

    /// Reads field `name`.
    ///
    /// # Errors
    /// Fails if the class has no such field.
    pub fn get(&self, name: &str) -> Result<Value> {
        let field = self.class.field(name).ok_or_else(|| {
            Error::reflection(format!("No such field '{name}' in {}", self.class))
        })?;
        field.get(self)
    }

    /// Calls the first method called `name` that takes no parameters.
    ///
    /// # Errors
    /// Fails if there is no such method or the call fails.
    pub fn call(&self, name: &str) -> Result<Value> {
        let method = self
            .class
            .methods_named(name)
            .find(|m| m.params.is_empty())
            .ok_or_else(|| {
                Error::reflection(format!(
                    "No parameterless method '{name}' in {}",
                    self.class
                ))
            })?;
        method.invoke(self, &mut Args::empty())
    }

    /// Runs the class's variable initializer, if any.
    ///
    /// # Errors
    /// Propagates the initializer's failure.
    pub fn init_variables(&self, variables: &mut Variables) -> Result<()> {
        match &self.class.variables {
            Some(init) => init(&*self.instance, variables),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:p}", self.class.name, Arc::as_ptr(&self.instance))
    }
}

// =============================================================================
// Call arguments
// =============================================================================

/// A command source travelling inside a [`Value`].
#[derive(Clone)]
pub struct SourceRef(pub SharedSource);

impl NativeType for SourceRef {
    const TYPE_NAME: &'static str = "CommandSource";
}

/// Arguments of one method call.
pub struct Args<'a> {
    values: Vec<Value>,
    source: Option<&'a dyn CommandSource>,
    builder: Option<&'a mut NodeBuilder>,
}

impl<'a> Args<'a> {
    /// Positional values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            source: None,
            builder: None,
        }
    }

    /// No arguments.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A borrowed source, for requirement methods. Every source parameter
    /// receives it.
    #[must_use]
    pub fn with_source(source: &'a dyn CommandSource) -> Self {
        Self {
            values: Vec::new(),
            source: Some(source),
            builder: None,
        }
    }

    /// A node builder, for transform methods.
    #[must_use]
    pub fn with_builder(builder: &'a mut NodeBuilder) -> Self {
        Self {
            values: Vec::new(),
            source: None,
            builder: Some(builder),
        }
    }

    /// Number of positional values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no positional values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`.
    ///
    /// # Errors
    /// Fails if there is no such value.
    pub fn value(&self, index: usize) -> Result<&Value> {
        self.values
            .get(index)
            .ok_or_else(|| Error::reflection(format!("Missing parameter at index {index}")))
    }

    fn typed<T>(&self, index: usize, expected: Type, get: impl Fn(&Value) -> Option<T>) -> Result<T> {
        let value = self.value(index)?;
        get(value).ok_or_else(|| Error::type_mismatch(expected, value.value_type()))
    }

    /// The integer at `index`.
    ///
    /// # Errors
    /// Fails if the value is missing or not an integer.
    pub fn int(&self, index: usize) -> Result<i64> {
        self.typed(index, Type::Int, Value::as_int)
    }

    /// The number at `index`, widening integers.
    ///
    /// # Errors
    /// Fails if the value is missing or not a number.
    pub fn float(&self, index: usize) -> Result<f64> {
        self.typed(index, Type::Float, Value::as_float)
    }

    /// The boolean at `index`.
    ///
    /// # Errors
    /// Fails if the value is missing or not a boolean.
    pub fn bool(&self, index: usize) -> Result<bool> {
        self.typed(index, Type::Bool, Value::as_bool)
    }

    /// The string at `index`.
    ///
    /// # Errors
    /// Fails if the value is missing or not a string.
    pub fn string(&self, index: usize) -> Result<&str> {
        let value = self.value(index)?;
        value
            .as_str()
            .ok_or_else(|| Error::type_mismatch(Type::String, value.value_type()))
    }

    /// The host value at `index`.
    ///
    /// # Errors
    /// Fails if the value is missing or not a `T`.
    pub fn native<T: NativeType>(&self, index: usize) -> Result<&T> {
        let value = self.value(index)?;
        value
            .as_native::<T>()
            .ok_or_else(|| Error::type_mismatch(T::native_type(), value.value_type()))
    }

    /// The command source at `index`.
    ///
    /// # Errors
    /// Fails if the value is missing or not a source.
    pub fn source(&self, index: usize) -> Result<&dyn CommandSource> {
        match self.source {
            Some(source) => Ok(source),
            None => self.native::<SourceRef>(index).map(|s| &*s.0),
        }
    }

    /// The command context at `index`.
    ///
    /// # Errors
    /// Fails if the value is missing or not a context.
    pub fn context(&self, index: usize) -> Result<&CommandContext> {
        self.native::<CommandContext>(index)
    }

    /// A copy of the suggestions builder at `index`.
    ///
    /// # Errors
    /// Fails if the value is missing or not a builder.
    pub fn suggestions(&self, index: usize) -> Result<SuggestionsBuilder> {
        self.native::<SuggestionsBuilder>(index).cloned()
    }

    /// The node builder being transformed.
    ///
    /// # Errors
    /// Fails outside transform calls.
    pub fn node_builder(&mut self) -> Result<&mut NodeBuilder> {
        self.builder
            .as_deref_mut()
            .ok_or_else(|| Error::reflection("No node builder passed to this call"))
    }
}
