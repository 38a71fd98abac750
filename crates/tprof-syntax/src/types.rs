//! Written parameter types, as far as they can be recovered without
//! semantic analysis.
//!
//! Only what is needed to tell overloads apart is modelled: builtin types,
//! (possibly qualified, possibly templated) named types, pointers,
//! references, cv-qualifiers and function types. Typedef names stay names.

/// Fundamental types with a dedicated mangling code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// `void`
    Void,
    /// `bool` / `_Bool`
    Bool,
    /// `char`
    Char,
    /// `signed char`
    SignedChar,
    /// `unsigned char`
    UnsignedChar,
    /// `short`
    Short,
    /// `unsigned short`
    UnsignedShort,
    /// `int`
    Int,
    /// `unsigned int`
    UnsignedInt,
    /// `long`
    Long,
    /// `unsigned long`
    UnsignedLong,
    /// `long long`
    LongLong,
    /// `unsigned long long`
    UnsignedLongLong,
    /// `__int128`
    Int128,
    /// `unsigned __int128`
    UnsignedInt128,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `long double`
    LongDouble,
    /// `wchar_t`
    WChar,
    /// `char8_t`
    Char8,
    /// `char16_t`
    Char16,
    /// `char32_t`
    Char32,
    /// `decltype(nullptr)`
    NullPtr,
    /// `auto`
    Auto,
}

impl BuiltinType {
    /// Interprets a sequence of type-specifier keywords
    /// (`unsigned long long int`).
    ///
    /// Returns `None` when the words do not spell a builtin type.
    #[must_use]
    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut signedness: Option<bool> = None;
        let mut longs = 0u8;
        let mut short = false;
        let mut base: Option<&str> = None;

        for word in words {
            match word {
                "signed" | "__signed" | "__signed__" => signedness = Some(true),
                "unsigned" | "__unsigned" => signedness = Some(false),
                "long" => longs = longs.saturating_add(1),
                "short" => short = true,
                other => {
                    if base.replace(other).is_some() {
                        return None;
                    }
                }
            }
        }

        let unsigned = signedness == Some(false);
        match (base.unwrap_or("int"), short, longs) {
            ("int", true, 0) => Some(if unsigned { Self::UnsignedShort } else { Self::Short }),
            ("int", false, 0) => Some(if unsigned { Self::UnsignedInt } else { Self::Int }),
            ("int", false, 1) => Some(if unsigned { Self::UnsignedLong } else { Self::Long }),
            ("int", false, 2) => Some(if unsigned {
                Self::UnsignedLongLong
            } else {
                Self::LongLong
            }),
            ("char", false, 0) => Some(match signedness {
                None => Self::Char,
                Some(true) => Self::SignedChar,
                Some(false) => Self::UnsignedChar,
            }),
            ("__int128", false, 0) => Some(if unsigned {
                Self::UnsignedInt128
            } else {
                Self::Int128
            }),
            ("double", false, 1) => Some(Self::LongDouble),
            (name, false, 0) if signedness.is_none() => Self::from_name(name),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "void" => Some(Self::Void),
            "bool" | "_Bool" => Some(Self::Bool),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "wchar_t" => Some(Self::WChar),
            "char8_t" => Some(Self::Char8),
            "char16_t" => Some(Self::Char16),
            "char32_t" => Some(Self::Char32),
            "nullptr_t" => Some(Self::NullPtr),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    /// Returns the Itanium mangling code for the type.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Void => "v",
            Self::Bool => "b",
            Self::Char => "c",
            Self::SignedChar => "a",
            Self::UnsignedChar => "h",
            Self::Short => "s",
            Self::UnsignedShort => "t",
            Self::Int => "i",
            Self::UnsignedInt => "j",
            Self::Long => "l",
            Self::UnsignedLong => "m",
            Self::LongLong => "x",
            Self::UnsignedLongLong => "y",
            Self::Int128 => "n",
            Self::UnsignedInt128 => "o",
            Self::Float => "f",
            Self::Double => "d",
            Self::LongDouble => "e",
            Self::WChar => "w",
            Self::Char8 => "Du",
            Self::Char16 => "Ds",
            Self::Char32 => "Di",
            Self::NullPtr => "Dn",
            Self::Auto => "Da",
        }
    }
}

/// cv-qualifiers applied to a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Qualifiers {
    /// `const`
    pub is_const: bool,
    /// `volatile`
    pub is_volatile: bool,
}

impl Qualifiers {
    /// Returns whether no qualifier is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.is_const && !self.is_volatile
    }
}

/// A template argument of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateArg {
    /// A type argument (`vector<int>`).
    Type(TypeRepr),
    /// A non-type argument, kept as written (`array<int, 4>`).
    Value(String),
}

/// A parameter or return type as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRepr {
    /// A fundamental type.
    Builtin(BuiltinType),
    /// A class, enum, typedef or alias name.
    Named {
        /// Scope segments followed by the type name (`std`, `string`).
        path: Vec<String>,
        /// Template arguments of the last segment.
        args: Vec<TemplateArg>,
    },
    /// `T*`
    Pointer(Box<TypeRepr>),
    /// `T&`
    LValueRef(Box<TypeRepr>),
    /// `T&&`
    RValueRef(Box<TypeRepr>),
    /// `const T`, `volatile T`
    Qualified {
        /// The qualifiers applied.
        qualifiers: Qualifiers,
        /// The qualified type.
        inner: Box<TypeRepr>,
    },
    /// A function type, reached through a function pointer or reference.
    Function {
        /// Return type.
        ret: Box<TypeRepr>,
        /// Parameter types.
        params: Vec<TypeRepr>,
        /// Whether the parameter list ends in `...`.
        variadic: bool,
    },
}

impl TypeRepr {
    /// Creates an unscoped, untemplated named type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            path: vec![name.into()],
            args: Vec::new(),
        }
    }

    /// Wraps the type in the given qualifiers, if any are set.
    #[must_use]
    pub fn qualified(self, qualifiers: Qualifiers) -> Self {
        if qualifiers.is_empty() {
            return self;
        }
        Self::Qualified {
            qualifiers,
            inner: Box::new(self),
        }
    }

    /// Removes top-level cv-qualifiers, which do not take part in a
    /// function's signature.
    #[must_use]
    pub fn without_top_level_qualifiers(self) -> Self {
        match self {
            Self::Qualified { inner, .. } => inner.without_top_level_qualifiers(),
            other => other,
        }
    }

    /// Returns whether this is the `void` type spelt as a whole parameter
    /// list (`f(void)`).
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Builtin(BuiltinType::Void))
    }
}
