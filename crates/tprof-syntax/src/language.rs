//! Language detection and Tree-sitter grammar selection.
//!
//! This module provides the [`SupportedLanguage`] enum for identifying the
//! dialect of a translation unit and mapping it to its Tree-sitter grammar.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Languages accepted by the front end.
///
/// The dialect matters beyond grammar selection: it decides whether
/// function identifiers are mangled and whether member calls resolve to a
/// direct callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// C source files (`.c`, `.h`).
    #[default]
    C,
    /// C++ source files (`.cc`, `.cpp`, `.cxx`, `.c++`, `.hh`, `.hpp`, `.hxx`).
    Cpp,
}

impl SupportedLanguage {
    /// Detects the language from a file extension.
    ///
    /// Returns `None` if the extension is not recognised.
    ///
    /// # Examples
    ///
    /// ```
    /// use tprof_syntax::SupportedLanguage;
    ///
    /// assert_eq!(
    ///     SupportedLanguage::from_extension("cpp"),
    ///     Some(SupportedLanguage::Cpp)
    /// );
    /// assert_eq!(SupportedLanguage::from_extension("rs"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let normalised = ext.to_ascii_lowercase();
        match normalised.as_str() {
            "c" | "h" | "i" => Some(Self::C),
            "cc" | "cpp" | "cxx" | "c++" | "cp" | "hh" | "hpp" | "hxx" | "h++" | "ii"
            | "ipp" | "tcc" => Some(Self::Cpp),
            _ => None,
        }
    }

    /// Detects the language from a file path by examining its extension.
    ///
    /// Returns `None` if the path has no extension or the extension is not
    /// recognised.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the Tree-sitter language grammar for this language.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::C => tree_sitter_c::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "c++",
        }
    }

    /// Returns whether the language has C++ semantics (overloading, member
    /// functions, namespaces).
    #[must_use]
    pub const fn is_cpp(self) -> bool {
        matches!(self, Self::Cpp)
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a language identifier fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    /// Accepts the spellings understood by a compiler's `-x` option.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "c" | "c-header" | "cpp-output" => Ok(Self::C),
            "c++" | "cpp" | "cxx" | "c++-header" | "c++-cpp-output" => Ok(Self::Cpp),
            other => Err(LanguageParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("c", SupportedLanguage::C)]
    #[case("h", SupportedLanguage::C)]
    #[case("cc", SupportedLanguage::Cpp)]
    #[case("cpp", SupportedLanguage::Cpp)]
    #[case("CXX", SupportedLanguage::Cpp)]
    #[case("hpp", SupportedLanguage::Cpp)]
    fn from_extension_recognises_supported_languages(
        #[case] ext: &str,
        #[case] expected: SupportedLanguage,
    ) {
        assert_eq!(SupportedLanguage::from_extension(ext), Some(expected));
    }

    #[rstest]
    #[case("rs")]
    #[case("py")]
    #[case("")]
    fn from_extension_returns_none_for_unknown(#[case] ext: &str) {
        assert_eq!(SupportedLanguage::from_extension(ext), None);
    }

    #[test]
    fn from_path_returns_none_for_no_extension() {
        assert_eq!(SupportedLanguage::from_path(Path::new("Makefile")), None);
    }

    #[rstest]
    #[case("c", SupportedLanguage::C)]
    #[case("c++", SupportedLanguage::Cpp)]
    #[case(" C++-Header ", SupportedLanguage::Cpp)]
    fn from_str_parses_driver_language_names(
        #[case] input: &str,
        #[case] expected: SupportedLanguage,
    ) {
        assert_eq!(SupportedLanguage::from_str(input), Ok(expected));
    }

    #[test]
    fn from_str_returns_error_for_unknown() {
        let result: Result<SupportedLanguage, _> = "objective-c".parse();
        assert_eq!(
            result.map_err(|error| error.input().to_owned()),
            Err("objective-c".to_owned())
        );
    }
}
