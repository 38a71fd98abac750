//! Lowering of the concrete Tree-sitter tree into function declarations and
//! statement trees.
//!
//! Function discovery descends through namespaces, linkage specifications,
//! class bodies, templates and preprocessor conditionals. Each function body
//! is lowered node by node: every named, non-extra child becomes a slot, and
//! the `body`, `consequence` and `alternative` fields are recorded as slot
//! indices on the parent's [`StmtKind`].

use std::collections::HashSet;

use tree_sitter::Node;

use crate::language::SupportedLanguage;
use crate::parser::ParseResult;
use crate::source::{FileId, SourceLocation, SourceManager, SourceSpan};
use crate::tree::{Callee, Stmt, StmtKind};
use crate::types::{BuiltinType, Qualifiers, TemplateArg, TypeRepr};
use crate::unit::{FunctionDecl, FunctionRole, Linkage, ScopeKind, ScopeSegment, Signature};

/// Nodes that are a single lexical token even though the grammar gives them
/// children (the quotes and contents of a literal).
const ATOMIC_TOKENS: &[&str] = &[
    "string_literal",
    "char_literal",
    "raw_string_literal",
    "system_lib_string",
];

/// Containers whose children are searched for further declarations.
const TRANSPARENT_CONTAINERS: &[&str] = &[
    "declaration_list",
    "field_declaration_list",
    "template_declaration",
    "preproc_if",
    "preproc_ifdef",
    "preproc_else",
    "preproc_elif",
    "preproc_elifdef",
];

/// Declarator kinds that name the declared entity.
const NAME_DECLARATORS: &[&str] = &[
    "identifier",
    "field_identifier",
    "qualified_identifier",
    "destructor_name",
    "operator_name",
    "template_function",
];

/// Lowers every function declaration of a parsed main file.
pub(crate) fn lower_translation_unit(
    parsed: &ParseResult,
    sources: &SourceManager,
) -> Vec<FunctionDecl> {
    let language = parsed.language();
    let mut lowering = Lowering {
        parsed,
        file: sources.main_file_id(),
        language,
        globals: HashSet::new(),
    };
    lowering.globals = lowering.namespace_variables(parsed.root_node());
    let context = ItemContext {
        scope: Vec::new(),
        linkage: if language.is_cpp() {
            Linkage::Cxx
        } else {
            Linkage::C
        },
    };
    let mut out = Vec::new();
    lowering.collect_children(parsed.root_node(), &context, &mut out);
    out
}

/// Scope and linkage in effect at a point of the declaration walk.
#[derive(Debug, Clone)]
struct ItemContext {
    scope: Vec<ScopeSegment>,
    linkage: Linkage,
}

impl ItemContext {
    fn nested(&self, segment: ScopeSegment) -> Self {
        let mut scope = self.scope.clone();
        scope.push(segment);
        Self {
            scope,
            linkage: self.linkage,
        }
    }

    fn outside_class(&self) -> Self {
        let mut scope = self.scope.clone();
        while scope.last().is_some_and(|s| s.kind == ScopeKind::Class) {
            scope.pop();
        }
        Self {
            scope,
            linkage: self.linkage,
        }
    }
}

/// Name, scope and signature read from a function declarator.
struct FunctionHeader {
    name: String,
    role: FunctionRole,
    scope: Vec<ScopeSegment>,
    signature: Signature,
}

/// Slot indices of role-bearing fields, collected while lowering children.
#[derive(Default)]
struct FieldSlots {
    body: Option<usize>,
    consequence: Option<usize>,
    alternative: Option<usize>,
}

struct Lowering<'p> {
    parsed: &'p ParseResult,
    file: FileId,
    language: SupportedLanguage,
    /// Namespace-scope variables that calls may go through.
    globals: HashSet<&'p str>,
}

impl<'p> Lowering<'p> {
    fn text(&self, node: Node<'_>) -> &'p str {
        self.parsed.text_of(node)
    }

    fn has_qualifier(&self, node: Node<'_>, qualifier: &str) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|child| child.kind() == "type_qualifier" && self.text(child).trim() == qualifier)
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    fn collect_children(&self, node: Node<'_>, context: &ItemContext, out: &mut Vec<FunctionDecl>) {
        for child in named_children(node) {
            self.collect_item(child, context, out);
        }
    }

    fn collect_item(&self, node: Node<'_>, context: &ItemContext, out: &mut Vec<FunctionDecl>) {
        match node.kind() {
            "function_definition" => self.function_definition(node, context, out),
            "declaration" | "field_declaration" => {
                self.prototypes(node, context, out);
                self.nested_types(node, context, out);
            }
            "type_definition" => self.nested_types(node, context, out),
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                self.class_body(node, context, out);
            }
            "namespace_definition" => self.namespace(node, context, out),
            "linkage_specification" => self.linkage_block(node, context, out),
            "friend_declaration" => self.collect_children(node, &context.outside_class(), out),
            kind if TRANSPARENT_CONTAINERS.contains(&kind) => {
                self.collect_children(node, context, out);
            }
            _ => {}
        }
    }

    fn function_definition(
        &self,
        node: Node<'_>,
        context: &ItemContext,
        out: &mut Vec<FunctionDecl>,
    ) {
        let Some(declarator) = node.child_by_field_name("declarator") else {
            return;
        };
        let Some(header) = self.function_header(declarator, context) else {
            return;
        };

        let body_node = node.child_by_field_name("body");
        let mut decl = self.declaration_for(node, header, context);
        if let Some(body_node) = body_node {
            let locals = self.locals(declarator, body_node);
            decl = decl.with_body(self.lower_stmt(body_node, &locals));
        }
        out.push(decl);
    }

    fn prototypes(&self, node: Node<'_>, context: &ItemContext, out: &mut Vec<FunctionDecl>) {
        let mut cursor = node.walk();
        let declarators: Vec<Node<'_>> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();
        for declarator in declarators {
            if let Some(header) = self.function_header(declarator, context) {
                out.push(self.declaration_for(node, header, context));
            }
        }
    }

    fn declaration_for(
        &self,
        node: Node<'_>,
        header: FunctionHeader,
        context: &ItemContext,
    ) -> FunctionDecl {
        FunctionDecl::new(
            header.name,
            SourceLocation::new(self.file, node.start_byte()),
            node.byte_range(),
        )
        .with_role(header.role)
        .with_scope(header.scope)
        .with_signature(header.signature)
        .with_linkage(context.linkage)
    }

    fn nested_types(&self, node: Node<'_>, context: &ItemContext, out: &mut Vec<FunctionDecl>) {
        if let Some(ty) = node.child_by_field_name("type")
            && matches!(
                ty.kind(),
                "class_specifier" | "struct_specifier" | "union_specifier"
            )
        {
            self.class_body(ty, context, out);
        }
    }

    fn class_body(&self, node: Node<'_>, context: &ItemContext, out: &mut Vec<FunctionDecl>) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let segment = match node.child_by_field_name("name") {
            Some(name) => self.scope_segment(name, ScopeKind::Class),
            None => ScopeSegment::new("", ScopeKind::Class),
        };
        self.collect_children(body, &context.nested(segment), out);
    }

    fn namespace(&self, node: Node<'_>, context: &ItemContext, out: &mut Vec<FunctionDecl>) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let names: Vec<&str> = node
            .child_by_field_name("name")
            .map(|name| {
                self.text(name)
                    .split("::")
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let mut inner = context.clone();
        if names.is_empty() {
            inner = inner.nested(ScopeSegment::new("", ScopeKind::Namespace));
        }
        for name in names {
            inner = inner.nested(ScopeSegment::new(name, ScopeKind::Namespace));
        }
        self.collect_children(body, &inner, out);
    }

    fn linkage_block(&self, node: Node<'_>, context: &ItemContext, out: &mut Vec<FunctionDecl>) {
        let linkage = match node.child_by_field_name("value").map(|v| self.text(v)) {
            Some("\"C\"") => Linkage::C,
            _ => Linkage::Cxx,
        };
        let inner = ItemContext {
            scope: context.scope.clone(),
            linkage,
        };
        match node.child_by_field_name("body") {
            Some(body) if body.kind() == "declaration_list" => {
                self.collect_children(body, &inner, out);
            }
            Some(body) => self.collect_item(body, &inner, out),
            None => {}
        }
    }

    // ---------------------------------------------------------------------
    // Function headers
    // ---------------------------------------------------------------------

    fn function_header(&self, declarator: Node<'_>, context: &ItemContext) -> Option<FunctionHeader> {
        let (qualifiers, leaf, function) = match find_function_declarator(declarator) {
            Some(function) => {
                let (qualifiers, leaf) =
                    self.split_qualified(function.child_by_field_name("declarator")?);
                (qualifiers, leaf, function)
            }
            None => {
                // Conversion operators carry their parameter list inside.
                let (qualifiers, leaf) = self.split_qualified(declarator);
                if leaf.kind() != "operator_cast" {
                    return None;
                }
                let function = descend_to(leaf, "abstract_function_declarator")?;
                (qualifiers, leaf, function)
            }
        };

        let mut scope = context.scope.clone();
        scope.extend(qualifiers);

        let mut signature = self.parameters(function.child_by_field_name("parameters"));
        signature.is_const = self.has_qualifier(function, "const");

        let (name, role) = match leaf.kind() {
            "identifier" | "field_identifier" => {
                let name = self.text(leaf).to_owned();
                let is_constructor = scope
                    .last()
                    .is_some_and(|s| s.kind != ScopeKind::Namespace && s.name == name);
                let role = if is_constructor {
                    FunctionRole::Constructor
                } else {
                    FunctionRole::Plain
                };
                (name, role)
            }
            "destructor_name" => (self.text(leaf).to_owned(), FunctionRole::Destructor),
            "operator_name" => {
                let text = self.text(leaf);
                (text.to_owned(), FunctionRole::Operator(operator_symbol(text)))
            }
            "template_function" => {
                let name = self.text(leaf.child_by_field_name("name")?).to_owned();
                signature.template_args = self.template_args(leaf.child_by_field_name("arguments"));
                (name, FunctionRole::Plain)
            }
            "operator_cast" => {
                let spelled = collapse_whitespace(self.text(leaf.child_by_field_name("type")?));
                (
                    format!("operator {spelled}"),
                    FunctionRole::Conversion(self.base_type(leaf)),
                )
            }
            _ => return None,
        };

        Some(FunctionHeader {
            name,
            role,
            scope,
            signature,
        })
    }

    /// Splits `a::b::name` into its qualifier segments and the final name.
    fn split_qualified<'t>(&self, node: Node<'t>) -> (Vec<ScopeSegment>, Node<'t>) {
        let mut segments = Vec::new();
        let mut current = node;
        while matches!(
            current.kind(),
            "qualified_identifier" | "qualified_operator_cast_identifier"
        ) {
            if let Some(scope) = current.child_by_field_name("scope") {
                segments.push(self.scope_segment(scope, ScopeKind::Qualifier));
            }
            match current.child_by_field_name("name") {
                Some(name) => current = name,
                None => break,
            }
        }
        (segments, current)
    }

    fn scope_segment(&self, node: Node<'_>, kind: ScopeKind) -> ScopeSegment {
        match node.kind() {
            "template_type" => ScopeSegment {
                name: node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_owned())
                    .unwrap_or_default(),
                kind,
                template_args: self.template_args(node.child_by_field_name("arguments")),
            },
            "qualified_identifier" => {
                let (_, leaf) = self.split_qualified(node);
                self.scope_segment(leaf, kind)
            }
            _ => ScopeSegment::new(self.text(node), kind),
        }
    }

    fn parameters(&self, list: Option<Node<'_>>) -> Signature {
        let mut signature = Signature::default();
        let Some(list) = list else {
            return signature;
        };
        let mut cursor = list.walk();
        let params: Vec<Node<'_>> = list
            .children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect();
        for param in params {
            match param.kind() {
                "variadic_parameter" | "..." => signature.variadic = true,
                "parameter_declaration"
                | "optional_parameter_declaration"
                | "variadic_parameter_declaration" => {
                    let ty = self.apply_declarator(
                        self.base_type(param),
                        param.child_by_field_name("declarator"),
                    );
                    signature.params.push(ty.without_top_level_qualifiers());
                }
                _ => {}
            }
        }
        if signature.params.len() == 1
            && !signature.variadic
            && signature.params.first().is_some_and(TypeRepr::is_void)
        {
            signature.params.clear();
        }
        signature
    }

    // ---------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------

    /// Reads the `type` field of a declaration-like node together with the
    /// cv-qualifiers written beside it.
    fn base_type(&self, node: Node<'_>) -> TypeRepr {
        let qualifiers = Qualifiers {
            is_const: self.has_qualifier(node, "const"),
            is_volatile: self.has_qualifier(node, "volatile"),
        };
        node.child_by_field_name("type")
            .map_or(TypeRepr::Builtin(BuiltinType::Int), |ty| {
                self.type_specifier(ty)
            })
            .qualified(qualifiers)
    }

    fn type_specifier(&self, node: Node<'_>) -> TypeRepr {
        match node.kind() {
            "primitive_type" => {
                let text = self.text(node);
                BuiltinType::from_words([text])
                    .map_or_else(|| TypeRepr::named(text), TypeRepr::Builtin)
            }
            "sized_type_specifier" => {
                let mut cursor = node.walk();
                let words: Vec<&str> = node
                    .children(&mut cursor)
                    .filter(|child| !child.is_extra())
                    .map(|child| self.text(child))
                    .collect();
                BuiltinType::from_words(words.iter().copied()).map_or_else(
                    || TypeRepr::named(words.join(" ")),
                    TypeRepr::Builtin,
                )
            }
            "placeholder_type_specifier" => TypeRepr::Builtin(BuiltinType::Auto),
            "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier" => node
                .child_by_field_name("name")
                .map_or_else(|| TypeRepr::named(""), |name| self.type_specifier(name)),
            "template_type" => TypeRepr::Named {
                path: vec![node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_owned())
                    .unwrap_or_default()],
                args: self.template_args(node.child_by_field_name("arguments")),
            },
            "qualified_identifier" => {
                let (segments, leaf) = self.split_qualified(node);
                let mut path: Vec<String> = segments.into_iter().map(|s| s.name).collect();
                match self.type_specifier(leaf) {
                    TypeRepr::Named { path: tail, args } => {
                        path.extend(tail);
                        TypeRepr::Named { path, args }
                    }
                    other => other,
                }
            }
            "dependent_type" => named_children(node)
                .first()
                .map_or_else(|| TypeRepr::named(self.text(node)), |inner| {
                    self.type_specifier(*inner)
                }),
            _ => TypeRepr::named(collapse_whitespace(self.text(node))),
        }
    }

    fn template_args(&self, list: Option<Node<'_>>) -> Vec<TemplateArg> {
        let Some(list) = list else {
            return Vec::new();
        };
        named_children(list)
            .into_iter()
            .map(|arg| {
                if arg.kind() == "type_descriptor" {
                    TemplateArg::Type(self.apply_declarator(
                        self.base_type(arg),
                        arg.child_by_field_name("declarator"),
                    ))
                } else {
                    TemplateArg::Value(collapse_whitespace(self.text(arg)))
                }
            })
            .collect()
    }

    /// Wraps `base` in the pointer, reference, array and function layers of
    /// a declarator, outermost layer first.
    fn apply_declarator(&self, base: TypeRepr, declarator: Option<Node<'_>>) -> TypeRepr {
        let Some(node) = declarator else {
            return base;
        };
        match node.kind() {
            "pointer_declarator" | "abstract_pointer_declarator" => {
                let pointer = TypeRepr::Pointer(Box::new(base)).qualified(Qualifiers {
                    is_const: self.has_qualifier(node, "const"),
                    is_volatile: self.has_qualifier(node, "volatile"),
                });
                self.apply_declarator(pointer, node.child_by_field_name("declarator"))
            }
            "reference_declarator" | "abstract_reference_declarator" => {
                let rvalue = first_token_kind(node) == Some("&&");
                let reference = if rvalue {
                    TypeRepr::RValueRef(Box::new(base))
                } else {
                    TypeRepr::LValueRef(Box::new(base))
                };
                self.apply_declarator(reference, named_children(node).last().copied())
            }
            "array_declarator" | "abstract_array_declarator" => self.apply_declarator(
                TypeRepr::Pointer(Box::new(base)),
                node.child_by_field_name("declarator"),
            ),
            "function_declarator" | "abstract_function_declarator" => {
                let signature = self.parameters(node.child_by_field_name("parameters"));
                let function = TypeRepr::Function {
                    ret: Box::new(base),
                    params: signature.params,
                    variadic: signature.variadic,
                };
                self.apply_declarator(function, node.child_by_field_name("declarator"))
            }
            "parenthesized_declarator" | "abstract_parenthesized_declarator" => {
                self.apply_declarator(base, named_children(node).last().copied())
            }
            _ => base,
        }
    }

    // ---------------------------------------------------------------------
    // Namespace-scope variables
    // ---------------------------------------------------------------------

    /// Unqualified names of variables declared outside any function or
    /// class, such as file-scope function pointers.
    ///
    /// Names also declared as functions at namespace scope are left out.
    fn namespace_variables(&self, root: Node<'_>) -> HashSet<&'p str> {
        let mut variables = HashSet::new();
        let mut functions = HashSet::new();
        self.collect_namespace_names(root, &mut variables, &mut functions);
        variables.retain(|name| !functions.contains(name));
        variables
    }

    fn collect_namespace_names(
        &self,
        node: Node<'_>,
        variables: &mut HashSet<&'p str>,
        functions: &mut HashSet<&'p str>,
    ) {
        match node.kind() {
            "declaration" => {
                let mut cursor = node.walk();
                let declarators: Vec<Node<'_>> = node
                    .children_by_field_name("declarator", &mut cursor)
                    .collect();
                for declarator in declarators {
                    if let Some(function) = find_function_declarator(declarator) {
                        functions.extend(self.function_name(function));
                    } else if let Some(name) = self.declared_name(declarator) {
                        variables.insert(name);
                    }
                }
            }
            "function_definition" => {
                if let Some(function) = node
                    .child_by_field_name("declarator")
                    .and_then(find_function_declarator)
                {
                    functions.extend(self.function_name(function));
                }
            }
            "namespace_definition" | "linkage_specification" => {
                if let Some(body) = node.child_by_field_name("body") {
                    self.collect_namespace_names(body, variables, functions);
                }
            }
            "translation_unit" => {
                for child in named_children(node) {
                    self.collect_namespace_names(child, variables, functions);
                }
            }
            kind if kind != "field_declaration_list" && TRANSPARENT_CONTAINERS.contains(&kind) => {
                for child in named_children(node) {
                    self.collect_namespace_names(child, variables, functions);
                }
            }
            _ => {}
        }
    }

    fn function_name(&self, function: Node<'_>) -> Option<&'p str> {
        function
            .child_by_field_name("declarator")
            .and_then(|name| self.unqualified_name(name))
    }

    // ---------------------------------------------------------------------
    // Bodies
    // ---------------------------------------------------------------------

    /// Names that denote variables inside a function: its parameters and
    /// locals, plus the namespace-scope variables no block-scope function
    /// declaration hides.
    ///
    /// A call through one of these names is a call through a variable.
    fn locals(&self, declarator: Node<'_>, body: Node<'_>) -> HashSet<&'p str> {
        let mut names = HashSet::new();
        let mut prototypes = HashSet::new();
        if let Some(function) = find_function_declarator(declarator)
            && let Some(params) = function.child_by_field_name("parameters")
        {
            self.collect_locals(params, &mut names, &mut prototypes);
        }
        self.collect_locals(body, &mut names, &mut prototypes);
        names.extend(self.globals.difference(&prototypes).copied());
        names
    }

    fn collect_locals(
        &self,
        node: Node<'_>,
        names: &mut HashSet<&'p str>,
        prototypes: &mut HashSet<&'p str>,
    ) {
        match node.kind() {
            "declaration" | "for_range_loop" => {
                let mut cursor = node.walk();
                let declarators: Vec<Node<'_>> = node
                    .children_by_field_name("declarator", &mut cursor)
                    .collect();
                for declarator in declarators {
                    if is_function_prototype(declarator) {
                        prototypes.extend(self.function_name(declarator));
                    } else if let Some(name) = self.declared_name(declarator) {
                        names.insert(name);
                    }
                }
            }
            "parameter_declaration" | "optional_parameter_declaration" => {
                if let Some(name) = node
                    .child_by_field_name("declarator")
                    .and_then(|d| self.declared_name(d))
                {
                    names.insert(name);
                }
            }
            _ => {}
        }
        for child in named_children(node) {
            self.collect_locals(child, names, prototypes);
        }
    }

    fn declared_name(&self, node: Node<'_>) -> Option<&'p str> {
        match node.kind() {
            "identifier" | "field_identifier" => Some(self.text(node)),
            "init_declarator" | "pointer_declarator" | "array_declarator"
            | "function_declarator" | "attributed_declarator" => node
                .child_by_field_name("declarator")
                .and_then(|inner| self.declared_name(inner)),
            "reference_declarator" | "parenthesized_declarator" => named_children(node)
                .last()
                .and_then(|inner| self.declared_name(*inner)),
            _ => None,
        }
    }

    fn lower_stmt(&self, node: Node<'_>, locals: &HashSet<&'p str>) -> Stmt {
        let mut slots = FieldSlots::default();
        let mut children = Vec::new();
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.is_named() && !child.is_extra() {
                    let index = children.len();
                    match cursor.field_name() {
                        Some("body") => slots.body = Some(index),
                        Some("consequence") => slots.consequence = Some(index),
                        Some("alternative") => slots.alternative = Some(index),
                        _ => {}
                    }
                    let lowered = if child.kind() == "else_clause" {
                        named_children(child).first().copied()
                    } else {
                        Some(child)
                    };
                    children.push(lowered.map(|inner| self.lower_stmt(inner, locals)));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        let kind = self.stmt_kind(node, &slots, locals);
        Stmt::new(kind, self.span_of(node), children)
    }

    fn stmt_kind(&self, node: Node<'_>, slots: &FieldSlots, locals: &HashSet<&'p str>) -> StmtKind {
        let other = StmtKind::Other { tag: node.kind() };
        match node.kind() {
            "compound_statement" => StmtKind::Compound,
            "for_statement" => slots.body.map_or(other, |body| StmtKind::For { body }),
            "for_range_loop" => slots.body.map_or(other, |body| StmtKind::RangeFor { body }),
            "while_statement" => slots.body.map_or(other, |body| StmtKind::While { body }),
            "do_statement" => slots.body.map_or(other, |body| StmtKind::Do { body }),
            "if_statement" => slots.consequence.map_or(other, |then_branch| StmtKind::If {
                then_branch,
                else_branch: slots.alternative,
            }),
            "call_expression" => StmtKind::Call {
                callee: self.callee(node, locals),
            },
            _ => other,
        }
    }

    fn callee(&self, call: Node<'_>, locals: &HashSet<&'p str>) -> Callee {
        let Some(function) = call.child_by_field_name("function") else {
            return Callee::Indirect;
        };
        let name = match function.kind() {
            "identifier" => {
                let name = self.text(function);
                (!locals.contains(name)).then_some(name)
            }
            "qualified_identifier" => self
                .unqualified_name(function)
                .filter(|name| !self.globals.contains(name)),
            "template_function" => self.unqualified_name(function),
            "field_expression" if self.language.is_cpp() => function
                .child_by_field_name("field")
                .and_then(|field| self.unqualified_name(field)),
            _ => None,
        };
        name.map_or(Callee::Indirect, |callee| Callee::Direct {
            name: callee.to_owned(),
        })
    }

    fn unqualified_name(&self, node: Node<'_>) -> Option<&'p str> {
        match node.kind() {
            "identifier" | "field_identifier" | "destructor_name" | "operator_name" => {
                Some(self.text(node))
            }
            "qualified_identifier" | "qualified_field_identifier" | "template_function"
            | "template_method" => node
                .child_by_field_name("name")
                .and_then(|name| self.unqualified_name(name)),
            _ => None,
        }
    }

    fn span_of(&self, node: Node<'_>) -> SourceSpan {
        SourceSpan::new(
            SourceLocation::new(self.file, node.start_byte()),
            SourceLocation::new(self.file, last_token_start(node)),
        )
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// Returns the start offset of the last token of `node`.
fn last_token_start(node: Node<'_>) -> usize {
    let mut current = node;
    loop {
        if ATOMIC_TOKENS.contains(&current.kind()) {
            return current.start_byte();
        }
        let mut cursor = current.walk();
        let last = current
            .children(&mut cursor)
            .filter(|child| !child.is_extra() && child.end_byte() > child.start_byte())
            .last();
        match last {
            Some(child) => current = child,
            None => return current.start_byte(),
        }
    }
}

fn first_token_kind(node: Node<'_>) -> Option<&'static str> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .next()
        .map(|child| child.kind())
}

/// Finds the function declarator that directly names the declared entity.
fn find_function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "function_declarator" => {
            let inner = node.child_by_field_name("declarator")?;
            if NAME_DECLARATORS.contains(&inner.kind()) {
                Some(node)
            } else {
                find_function_declarator(inner)
            }
        }
        "pointer_declarator" | "init_declarator" | "attributed_declarator" => {
            find_function_declarator(node.child_by_field_name("declarator")?)
        }
        "reference_declarator" | "parenthesized_declarator" => {
            find_function_declarator(*named_children(node).last()?)
        }
        _ => None,
    }
}

/// Returns whether a block-scope declarator declares a function rather than
/// a variable.
fn is_function_prototype(node: Node<'_>) -> bool {
    node.kind() == "function_declarator"
        && node
            .child_by_field_name("declarator")
            .is_some_and(|inner| NAME_DECLARATORS.contains(&inner.kind()))
}

fn descend_to<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut current = node.child_by_field_name("declarator")?;
    loop {
        if current.kind() == kind {
            return Some(current);
        }
        current = current.child_by_field_name("declarator")?;
    }
}

/// Spells an `operator_name` without its keyword or whitespace.
fn operator_symbol(text: &str) -> String {
    text.strip_prefix("operator")
        .unwrap_or(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
