//! Stable per-function identifiers.
//!
//! C++ functions are named with an Itanium-style mangling so that overloads
//! map to distinct identifiers. Substitution compression (`S_`, `St`) is not
//! performed: the result is deterministic and distinct per signature, which
//! is all an output key needs, but it is not guaranteed to match the symbol
//! a compiler emits.

use std::fmt::Write as _;

use crate::language::SupportedLanguage;
use crate::types::{TemplateArg, TypeRepr};
use crate::unit::{FunctionDecl, FunctionRole, Linkage, ScopeKind, ScopeSegment};

/// Produces stable identifiers for the functions of one translation unit.
#[derive(Debug, Clone, Copy)]
pub struct NameMangler {
    language: SupportedLanguage,
}

impl NameMangler {
    /// Creates a mangler for a unit of the given language.
    #[must_use]
    pub const fn new(language: SupportedLanguage) -> Self {
        Self { language }
    }

    /// Returns whether `function` has a mangled identifier.
    ///
    /// C functions, `main`, and functions with C language linkage keep their
    /// plain name.
    #[must_use]
    pub fn should_mangle(&self, function: &FunctionDecl) -> bool {
        if !self.language.is_cpp() || function.linkage() == Linkage::C {
            return false;
        }
        !(function.name() == "main" && function.scope().is_empty())
    }

    /// Returns the Itanium-style mangled name of `function`.
    #[must_use]
    pub fn mangle(&self, function: &FunctionDecl) -> String {
        let mut out = String::from("_Z");
        let signature = function.signature();
        let nested = !function.scope().is_empty() || signature.is_const;

        if nested {
            out.push('N');
            if signature.is_const {
                out.push('K');
            }
            for segment in function.scope() {
                push_scope_segment(&mut out, segment);
            }
        }
        push_unqualified_name(&mut out, function);
        if !signature.template_args.is_empty() {
            push_template_args(&mut out, &signature.template_args);
        }
        if nested {
            out.push('E');
        }
        push_parameters(&mut out, &signature.params, signature.variadic);
        out
    }

    /// Returns the identifier used to key `function`'s output.
    #[must_use]
    pub fn stable_name(&self, function: &FunctionDecl) -> String {
        if self.should_mangle(function) {
            self.mangle(function)
        } else {
            function.name().to_owned()
        }
    }
}

fn push_source_name(out: &mut String, name: &str) {
    let _ = write!(out, "{}{name}", name.len());
}

fn push_scope_segment(out: &mut String, segment: &ScopeSegment) {
    match (segment.name.is_empty(), segment.kind) {
        (true, ScopeKind::Namespace) => push_source_name(out, "_GLOBAL__N_1"),
        (true, _) => out.push_str("Ut_"),
        (false, _) => push_source_name(out, &segment.name),
    }
    if !segment.template_args.is_empty() {
        push_template_args(out, &segment.template_args);
    }
}

fn push_unqualified_name(out: &mut String, function: &FunctionDecl) {
    match function.role() {
        FunctionRole::Plain => push_source_name(out, function.name()),
        FunctionRole::Constructor => out.push_str("C1"),
        FunctionRole::Destructor => out.push_str("D1"),
        FunctionRole::Operator(symbol) => {
            let arity = function
                .signature()
                .params
                .len()
                .saturating_add(usize::from(function.is_member()));
            push_operator(out, symbol, arity);
        }
        FunctionRole::Conversion(target) => {
            out.push_str("cv");
            push_type(out, target);
        }
    }
}

fn push_operator(out: &mut String, symbol: &str, arity: usize) {
    if let Some(suffix) = symbol.strip_prefix("\"\"") {
        out.push_str("li");
        push_source_name(out, suffix);
        return;
    }
    let unary = arity == 1;
    let code = match symbol {
        "new" => "nw",
        "new[]" => "na",
        "delete" => "dl",
        "delete[]" => "da",
        "+" if unary => "ps",
        "-" if unary => "ng",
        "&" if unary => "ad",
        "*" if unary => "de",
        "~" => "co",
        "+" => "pl",
        "-" => "mi",
        "*" => "ml",
        "/" => "dv",
        "%" => "rm",
        "&" => "an",
        "|" => "or",
        "^" => "eo",
        "=" => "aS",
        "+=" => "pL",
        "-=" => "mI",
        "*=" => "mL",
        "/=" => "dV",
        "%=" => "rM",
        "&=" => "aN",
        "|=" => "oR",
        "^=" => "eO",
        "<<" => "ls",
        ">>" => "rs",
        "<<=" => "lS",
        ">>=" => "rS",
        "==" => "eq",
        "!=" => "ne",
        "<" => "lt",
        ">" => "gt",
        "<=" => "le",
        ">=" => "ge",
        "<=>" => "ss",
        "!" => "nt",
        "&&" => "aa",
        "||" => "oo",
        "++" => "pp",
        "--" => "mm",
        "," => "cm",
        "->*" => "pm",
        "->" => "pt",
        "()" => "cl",
        "[]" => "ix",
        "co_await" => "aw",
        other => {
            // Vendor extended operator: keeps unknown spellings distinct.
            out.push_str("v0");
            push_source_name(out, other);
            return;
        }
    };
    out.push_str(code);
}

fn push_parameters(out: &mut String, params: &[TypeRepr], variadic: bool) {
    if params.is_empty() && !variadic {
        out.push('v');
        return;
    }
    for param in params {
        push_type(out, param);
    }
    if variadic {
        out.push('z');
    }
}

fn push_template_args(out: &mut String, args: &[TemplateArg]) {
    out.push('I');
    for arg in args {
        match arg {
            TemplateArg::Type(ty) => push_type(out, ty),
            TemplateArg::Value(value) => push_template_value(out, value),
        }
    }
    out.push('E');
}

fn push_template_value(out: &mut String, value: &str) {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        let sign = if digits.len() == value.len() { "" } else { "n" };
        let _ = write!(out, "Li{sign}{digits}E");
        return;
    }
    match value {
        "true" => out.push_str("Lb1E"),
        "false" => out.push_str("Lb0E"),
        other => {
            out.push('X');
            push_source_name(out, other);
            out.push('E');
        }
    }
}

fn push_type(out: &mut String, ty: &TypeRepr) {
    match ty {
        TypeRepr::Builtin(builtin) => out.push_str(builtin.code()),
        TypeRepr::Named { path, args } => {
            let nested = path.len() > 1;
            if nested {
                out.push('N');
            }
            for segment in path {
                push_source_name(out, segment);
            }
            if !args.is_empty() {
                push_template_args(out, args);
            }
            if nested {
                out.push('E');
            }
        }
        TypeRepr::Pointer(inner) => {
            out.push('P');
            push_type(out, inner);
        }
        TypeRepr::LValueRef(inner) => {
            out.push('R');
            push_type(out, inner);
        }
        TypeRepr::RValueRef(inner) => {
            out.push('O');
            push_type(out, inner);
        }
        TypeRepr::Qualified { qualifiers, inner } => {
            if qualifiers.is_volatile {
                out.push('V');
            }
            if qualifiers.is_const {
                out.push('K');
            }
            push_type(out, inner);
        }
        TypeRepr::Function {
            ret,
            params,
            variadic,
        } => {
            out.push('F');
            push_type(out, ret);
            push_parameters(out, params, *variadic);
            out.push('E');
        }
    }
}
