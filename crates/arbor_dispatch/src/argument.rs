//! Argument types: how an argument node turns input into a [`Value`].

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use arbor_foundation::{NativeType, ReadResult, SharedMap, StringReader, SyntaxError, Value};

use crate::context::CommandContext;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// Parses one argument from a reader.
pub trait ArgumentType: Send + Sync + fmt::Debug {
    /// Reads a value, leaving the cursor after it.
    ///
    /// # Errors
    /// Returns a positioned syntax error when the input does not fit.
    fn parse(&self, reader: &mut StringReader) -> ReadResult<Value>;

    /// Suggests completions for the partial token in `builder`.
    fn list_suggestions(&self, _context: &CommandContext, _builder: SuggestionsBuilder) -> Suggestions {
        Suggestions::empty()
    }

    /// Sample inputs, for documentation.
    fn examples(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A shared argument type.
#[derive(Clone)]
pub struct ArgumentTypeRef(Arc<dyn ArgumentType>);

impl ArgumentTypeRef {
    /// Shares an argument type.
    pub fn new(ty: impl ArgumentType + 'static) -> Self {
        Self(Arc::new(ty))
    }
}

impl Deref for ArgumentTypeRef {
    type Target = dyn ArgumentType;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for ArgumentTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl NativeType for ArgumentTypeRef {
    const TYPE_NAME: &'static str = "ArgumentType";
}

/// `true` or `false`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolArgument;

impl ArgumentType for BoolArgument {
    fn parse(&self, reader: &mut StringReader) -> ReadResult<Value> {
        reader.read_bool().map(Value::Bool)
    }

    fn list_suggestions(&self, _context: &CommandContext, mut builder: SuggestionsBuilder) -> Suggestions {
        builder.suggest_matching("true").suggest_matching("false");
        builder.build()
    }

    fn examples(&self) -> Vec<String> {
        vec!["true".into(), "false".into()]
    }
}

/// How much input a [`StringArgument`] consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringKind {
    /// One unquoted word.
    SingleWord,
    /// A word, or a quoted phrase.
    QuotablePhrase,
    /// Everything up to the end of input.
    GreedyPhrase,
}

/// A string argument.
#[derive(Clone, Copy, Debug)]
pub struct StringArgument {
    kind: StringKind,
}

impl StringArgument {
    /// One unquoted word.
    #[must_use]
    pub const fn word() -> Self {
        Self {
            kind: StringKind::SingleWord,
        }
    }

    /// A word or quoted phrase.
    #[must_use]
    pub const fn string() -> Self {
        Self {
            kind: StringKind::QuotablePhrase,
        }
    }

    /// The rest of the input.
    #[must_use]
    pub const fn greedy() -> Self {
        Self {
            kind: StringKind::GreedyPhrase,
        }
    }

    /// The consumption mode.
    #[must_use]
    pub const fn kind(&self) -> StringKind {
        self.kind
    }
}

impl ArgumentType for StringArgument {
    fn parse(&self, reader: &mut StringReader) -> ReadResult<Value> {
        match self.kind {
            StringKind::SingleWord => Ok(Value::from(reader.read_unquoted_string())),
            StringKind::QuotablePhrase => reader.read_string().map(Value::from),
            StringKind::GreedyPhrase => {
                let text = reader.remaining().to_string();
                reader.set_cursor(reader.total_len());
                Ok(Value::from(text))
            }
        }
    }

    fn examples(&self) -> Vec<String> {
        match self.kind {
            StringKind::SingleWord => vec!["word".into(), "words_with_underscores".into()],
            StringKind::QuotablePhrase => vec!["\"quoted phrase\"".into(), "word".into()],
            StringKind::GreedyPhrase => vec!["word".into(), "words with spaces".into()],
        }
    }
}

macro_rules! number_argument {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $kind:literal, $read:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug)]
        pub struct $name {
            min: $ty,
            max: $ty,
        }

        impl $name {
            /// Accepts the whole range of the type.
            #[must_use]
            pub const fn new() -> Self {
                Self {
                    min: <$ty>::MIN,
                    max: <$ty>::MAX,
                }
            }

            /// Accepts values in `min..=max`.
            #[must_use]
            pub const fn between(min: $ty, max: $ty) -> Self {
                Self { min, max }
            }

            /// Lower bound, inclusive.
            #[must_use]
            pub const fn min(&self) -> $ty {
                self.min
            }

            /// Upper bound, inclusive.
            #[must_use]
            pub const fn max(&self) -> $ty {
                self.max
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ArgumentType for $name {
            fn parse(&self, reader: &mut StringReader) -> ReadResult<Value> {
                let start = reader.cursor();
                let value = reader.$read()?;
                if value < self.min {
                    reader.set_cursor(start);
                    let err = SyntaxError::number_too_low(
                        $kind,
                        &self.min.to_string(),
                        &value.to_string(),
                    );
                    return Err(err.at(reader));
                }
                if value > self.max {
                    reader.set_cursor(start);
                    let err = SyntaxError::number_too_high(
                        $kind,
                        &self.max.to_string(),
                        &value.to_string(),
                    );
                    return Err(err.at(reader));
                }
                Ok(Value::from(value))
            }

            fn examples(&self) -> Vec<String> {
                vec!["0".into(), "123".into(), "-123".into()]
            }
        }
    };
}

number_argument!(
    /// A 32-bit integer, optionally bounded.
    IntegerArgument,
    i32,
    "integer",
    read_int
);
number_argument!(
    /// A 64-bit integer, optionally bounded.
    LongArgument,
    i64,
    "long",
    read_long
);
number_argument!(
    /// A 32-bit float, optionally bounded.
    FloatArgument,
    f32,
    "float",
    read_float
);
number_argument!(
    /// A 64-bit float, optionally bounded.
    DoubleArgument,
    f64,
    "double",
    read_double
);

/// One of a fixed set of words, matched case-insensitively.
#[derive(Clone, Debug)]
pub struct EnumArgument {
    choices: Vec<String>,
}

impl EnumArgument {
    /// Creates a choice argument.
    #[must_use]
    pub fn new(choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// The allowed words.
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl ArgumentType for EnumArgument {
    fn parse(&self, reader: &mut StringReader) -> ReadResult<Value> {
        let start = reader.cursor();
        let word = reader.read_unquoted_string().to_string();
        match self.choices.iter().find(|c| c.eq_ignore_ascii_case(&word)) {
            Some(choice) => Ok(Value::from(choice.as_str())),
            None => {
                reader.set_cursor(start);
                Err(SyntaxError::invalid_choice(&word).at(reader))
            }
        }
    }

    fn list_suggestions(&self, _context: &CommandContext, mut builder: SuggestionsBuilder) -> Suggestions {
        for choice in &self.choices {
            builder.suggest_matching(choice.to_lowercase());
        }
        builder.build()
    }

    fn examples(&self) -> Vec<String> {
        self.choices.iter().take(3).cloned().collect()
    }
}

/// A word looked up in a fixed string-keyed map.
#[derive(Clone, Debug)]
pub struct MapArgument {
    values: SharedMap<Arc<str>, Value>,
}

impl MapArgument {
    /// Creates a lookup argument.
    #[must_use]
    pub fn new(values: SharedMap<Arc<str>, Value>) -> Self {
        Self { values }
    }

    /// The lookup table.
    #[must_use]
    pub fn values(&self) -> &SharedMap<Arc<str>, Value> {
        &self.values
    }
}

impl ArgumentType for MapArgument {
    fn parse(&self, reader: &mut StringReader) -> ReadResult<Value> {
        let start = reader.cursor();
        while reader.peek().is_some_and(|c| !c.is_whitespace()) {
            reader.skip();
        }
        let word = &reader.string()[start..reader.cursor()];
        if let Some(value) = self.values.get(word) {
            return Ok(value.clone());
        }
        let err = SyntaxError::invalid_choice(word);
        reader.set_cursor(start);
        Err(err.at(reader))
    }

    fn list_suggestions(&self, _context: &CommandContext, mut builder: SuggestionsBuilder) -> Suggestions {
        for key in self.values.keys() {
            builder.suggest_matching(key.to_string());
        }
        builder.build()
    }

    fn examples(&self) -> Vec<String> {
        self.values.keys().take(3).map(ToString::to_string).collect()
    }
}

/// A comma-separated list of another argument type.
#[derive(Clone, Debug)]
pub struct ArrayArgument {
    element: ArgumentTypeRef,
}

#[derive(Default)]
struct ArrayProgress {
    items: Vec<Value>,
    last_start: usize,
    expect_separator: bool,
}

impl ArrayArgument {
    /// Creates a list argument over `element`.
    #[must_use]
    pub fn new(element: ArgumentTypeRef) -> Self {
        Self { element }
    }

    /// The element type.
    #[must_use]
    pub fn element(&self) -> &ArgumentTypeRef {
        &self.element
    }

    fn parse_items(&self, reader: &mut StringReader, progress: &mut ArrayProgress) -> ReadResult<()> {
        loop {
            progress.expect_separator = false;
            progress.last_start = reader.cursor();
            progress.items.push(self.element.parse(reader)?);

            progress.expect_separator = true;
            progress.last_start = reader.cursor();

            if !reader.can_read() {
                return Ok(());
            }

            if reader.peek().is_some_and(char::is_whitespace) {
                let before = reader.cursor();
                reader.skip_whitespace();
                if reader.peek() == Some(',') {
                    reader.skip();
                    reader.skip_whitespace();
                    continue;
                }
                reader.set_cursor(before);
                return Ok(());
            }

            if reader.peek() == Some(',') {
                reader.skip();
                reader.skip_whitespace();
            } else {
                return Err(SyntaxError::expected_separator().at(reader));
            }
        }
    }
}

impl ArgumentType for ArrayArgument {
    fn parse(&self, reader: &mut StringReader) -> ReadResult<Value> {
        let mut progress = ArrayProgress::default();
        self.parse_items(reader, &mut progress)?;
        Ok(Value::List(progress.items.into_iter().collect()))
    }

    fn list_suggestions(&self, context: &CommandContext, builder: SuggestionsBuilder) -> Suggestions {
        let mut reader = StringReader::new(builder.input());
        reader.set_cursor(builder.start());
        let mut progress = ArrayProgress {
            last_start: builder.start(),
            ..ArrayProgress::default()
        };
        let _ = self.parse_items(&mut reader, &mut progress);

        let mut builder = if progress.last_start == builder.start() {
            builder
        } else {
            builder.create_offset(progress.last_start)
        };
        if progress.expect_separator {
            builder.suggest(",");
            return builder.build();
        }
        self.element.list_suggestions(context, builder)
    }

    fn examples(&self) -> Vec<String> {
        self.element
            .examples()
            .first()
            .map(|e| vec![format!("{e},{e}")])
            .unwrap_or_default()
    }
}
