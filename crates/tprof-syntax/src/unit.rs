//! Function declarations and the translation unit that owns them.

use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::lower::lower_translation_unit;
use crate::parser::Parser;
use crate::source::{SourceLocation, SourceManager};
use crate::tree::Stmt;
use crate::types::{TemplateArg, TypeRepr};

/// Language linkage of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Linkage {
    /// Declared inside `extern "C"`, or compiled as C.
    C,
    /// Ordinary C++ linkage.
    #[default]
    Cxx,
}

/// What kind of entity encloses a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A `namespace` block.
    Namespace,
    /// A class, struct or union body.
    Class,
    /// A `scope::` qualifier on an out-of-line definition, whose kind is
    /// not visible syntactically.
    Qualifier,
}

/// One enclosing scope of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeSegment {
    /// Scope name; empty for anonymous namespaces and classes.
    pub name: String,
    /// Kind of scope.
    pub kind: ScopeKind,
    /// Template arguments written on the scope (`Box<int>::get`).
    pub template_args: Vec<TemplateArg>,
}

impl ScopeSegment {
    /// Creates a scope segment without template arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ScopeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            template_args: Vec::new(),
        }
    }
}

/// The special role a function name plays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FunctionRole {
    /// An ordinary named function.
    #[default]
    Plain,
    /// A constructor.
    Constructor,
    /// A destructor.
    Destructor,
    /// An overloaded operator, spelt without the `operator` keyword and
    /// without whitespace (`+`, `()`, `new[]`, `""_km`).
    Operator(String),
    /// A conversion function to the given type.
    Conversion(TypeRepr),
}

/// The parameter list and qualifiers that distinguish overloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    /// Parameter types, top-level qualifiers removed.
    pub params: Vec<TypeRepr>,
    /// Whether the list ends in `...`.
    pub variadic: bool,
    /// Whether the member function is `const`-qualified.
    pub is_const: bool,
    /// Explicit template arguments on the name (`f<int>`).
    pub template_args: Vec<TemplateArg>,
}

/// A function declared in a translation unit.
///
/// Declarations without a body are kept so that callers can see them being
/// filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    name: String,
    role: FunctionRole,
    scope: Vec<ScopeSegment>,
    signature: Signature,
    linkage: Linkage,
    location: SourceLocation,
    extent: Range<usize>,
    body: Option<Stmt>,
    definition: bool,
}

impl FunctionDecl {
    /// Creates a body-less, unscoped declaration of `name`.
    ///
    /// `location` is the position of the declaration's first token and
    /// `extent` the byte range of the whole declaration in that file.
    #[must_use]
    pub fn new(name: impl Into<String>, location: SourceLocation, extent: Range<usize>) -> Self {
        Self {
            name: name.into(),
            role: FunctionRole::Plain,
            scope: Vec::new(),
            signature: Signature::default(),
            linkage: Linkage::Cxx,
            location,
            extent,
            body: None,
            definition: false,
        }
    }

    /// Sets the name role.
    #[must_use]
    pub fn with_role(mut self, role: FunctionRole) -> Self {
        self.role = role;
        self
    }

    /// Sets the enclosing scopes, outermost first.
    #[must_use]
    pub fn with_scope(mut self, scope: Vec<ScopeSegment>) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Sets the language linkage.
    #[must_use]
    pub const fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Attaches a body, making this declaration a definition.
    #[must_use]
    pub fn with_body(mut self, body: Stmt) -> Self {
        self.body = Some(body);
        self.definition = true;
        self
    }

    /// Overrides whether this declaration is the defining one.
    ///
    /// A redeclaration can report a body that belongs to another
    /// declaration of the same function.
    #[must_use]
    pub const fn with_definition(mut self, definition: bool) -> Self {
        self.definition = definition;
        self
    }

    /// Returns the unqualified name as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name role.
    #[must_use]
    pub const fn role(&self) -> &FunctionRole {
        &self.role
    }

    /// Returns the enclosing scopes, outermost first.
    #[must_use]
    pub fn scope(&self) -> &[ScopeSegment] {
        &self.scope
    }

    /// Returns the signature.
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the language linkage.
    #[must_use]
    pub const fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Returns the location of the declaration's first token.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        self.location
    }

    /// Returns the byte range of the declaration within its file.
    #[must_use]
    pub fn extent(&self) -> Range<usize> {
        self.extent.clone()
    }

    /// Returns the body, if this declaration has one.
    #[must_use]
    pub const fn body(&self) -> Option<&Stmt> {
        self.body.as_ref()
    }

    /// Returns whether this is the defining declaration.
    #[must_use]
    pub const fn is_definition(&self) -> bool {
        self.definition
    }

    /// Returns whether the function is a member of a class.
    ///
    /// Out-of-line definitions (`Widget::draw`) count as members.
    #[must_use]
    pub fn is_member(&self) -> bool {
        self.scope
            .last()
            .is_some_and(|segment| segment.kind != ScopeKind::Namespace)
    }

    /// Returns the qualified name, for diagnostics.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let mut out = String::new();
        for segment in &self.scope {
            if segment.name.is_empty() {
                out.push_str("(anonymous)");
            } else {
                out.push_str(&segment.name);
            }
            out.push_str("::");
        }
        out.push_str(&self.name);
        out
    }
}

/// One parsed source file: its source manager and function declarations.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    language: SupportedLanguage,
    sources: SourceManager,
    functions: Vec<FunctionDecl>,
}

impl TranslationUnit {
    /// Assembles a translation unit from already-built parts.
    #[must_use]
    pub const fn from_parts(
        language: SupportedLanguage,
        sources: SourceManager,
        functions: Vec<FunctionDecl>,
    ) -> Self {
        Self {
            language,
            sources,
            functions,
        }
    }

    /// Parses `text` as the main file `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidSource`] when the parse tree contains
    /// syntax errors, [`SyntaxError::SourceTooLarge`] for texts beyond the
    /// parser's addressable size, and parser initialisation failures.
    pub fn parse(
        name: impl Into<String>,
        text: impl Into<String>,
        language: SupportedLanguage,
    ) -> Result<Self, SyntaxError> {
        let file_name = name.into();
        let source = text.into();
        if u32::try_from(source.len()).is_err() {
            return Err(SyntaxError::SourceTooLarge {
                file: file_name,
                len: source.len(),
            });
        }

        let mut parser = Parser::new(language)?;
        let parsed = parser.parse(&source)?;
        let errors = parsed.errors();
        if let Some(first) = errors.first() {
            return Err(SyntaxError::InvalidSource {
                file: file_name,
                line: first.line,
                column: first.column,
                message: first.message.clone(),
                count: errors.len(),
            });
        }

        let sources =
            SourceManager::new(file_name, source).with_comments(parsed.comment_ranges());
        let functions = lower_translation_unit(&parsed, &sources);
        Ok(Self::from_parts(language, sources, functions))
    }

    /// Reads and parses the file at `path`.
    ///
    /// The language is taken from `language` when given, otherwise from the
    /// file extension.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnknownLanguage`] when no language can be
    /// determined, [`SyntaxError::ReadError`] when the file cannot be read,
    /// and any error from [`TranslationUnit::parse`].
    pub fn read(path: &Path, language: Option<SupportedLanguage>) -> Result<Self, SyntaxError> {
        let resolved = language
            .or_else(|| SupportedLanguage::from_path(path))
            .ok_or_else(|| SyntaxError::unknown_language(path.to_path_buf()))?;
        let text =
            fs::read_to_string(path).map_err(|e| SyntaxError::read(path.to_path_buf(), e))?;
        Self::parse(path.display().to_string(), text, resolved)
    }

    /// Returns the language the unit was parsed as.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the source manager.
    #[must_use]
    pub const fn sources(&self) -> &SourceManager {
        &self.sources
    }

    /// Returns every function declaration in source order.
    #[must_use]
    pub fn functions(&self) -> &[FunctionDecl] {
        &self.functions
    }
}
