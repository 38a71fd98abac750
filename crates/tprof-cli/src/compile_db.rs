//! Compilation database loading and per-source command lookup.
//!
//! A database is a `compile_commands.json` array of
//! `{directory, file, command | arguments, output?}` entries. The compile
//! command for a source decides which grammar it is parsed with when the
//! command overrides the extension default (`-x c++`, `-std=c++17`, a C++
//! compiler driver).

use std::fs;
use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use thiserror::Error;

use tprof_syntax::SupportedLanguage;

/// File name searched for by database discovery.
pub const DATABASE_FILE_NAME: &str = "compile_commands.json";

/// Driver name placed in front of flags given after `--`.
pub const FIXED_DRIVER: &str = "clang-tool";

/// Errors raised while loading a compilation database.
#[derive(Debug, Error)]
pub enum CompileDbError {
    /// The database file could not be read.
    #[error("failed to read compilation database '{path}': {source}")]
    Read {
        /// Path of the database.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The database is not a valid JSON array of entries.
    #[error("malformed compilation database '{path}': {source}")]
    Parse {
        /// Path of the database.
        path: Utf8PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },

    /// An entry carries neither `command` nor `arguments`.
    #[error("entry for '{file}' in '{path}' has neither `command` nor `arguments`")]
    MissingCommand {
        /// Path of the database.
        path: Utf8PathBuf,
        /// The entry's `file` field.
        file: Utf8PathBuf,
    },

    /// A `command` string is not valid shell syntax, such as an unterminated
    /// quote.
    #[error("entry for '{file}' has a malformed command string")]
    MalformedCommand {
        /// The entry's `file` field.
        file: Utf8PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    directory: Utf8PathBuf,
    file: Utf8PathBuf,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    arguments: Option<Vec<String>>,
    #[serde(default)]
    output: Option<Utf8PathBuf>,
}

/// The compile command for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    directory: Utf8PathBuf,
    file: Utf8PathBuf,
    arguments: Vec<String>,
    output: Option<Utf8PathBuf>,
}

impl CompileCommand {
    /// Working directory of the compile.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Absolute, lexically normalised source path.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// Compiler driver followed by its arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Object file produced by the compile, if recorded.
    #[must_use]
    pub fn output(&self) -> Option<&Utf8Path> {
        self.output.as_deref()
    }
}

/// A loaded `compile_commands.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationDatabase {
    entries: Vec<CompileCommand>,
}

impl CompilationDatabase {
    /// Loads `compile_commands.json` from `directory`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileDbError`] when the file cannot be read or parsed.
    pub fn load(directory: &Utf8Path) -> Result<Self, CompileDbError> {
        let path = directory.join(DATABASE_FILE_NAME);
        let text = fs::read_to_string(&path).map_err(|source| CompileDbError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_json(&text, &path)
    }

    /// Searches `start` and its ancestors for a database.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileDbError`] when a database is found but cannot be
    /// loaded.
    pub fn discover(start: &Utf8Path) -> Result<Option<Self>, CompileDbError> {
        for directory in start.ancestors() {
            if directory.join(DATABASE_FILE_NAME).is_file() {
                return Self::load(directory).map(Some);
            }
        }
        Ok(None)
    }

    /// Parses database JSON; `origin` names the file in errors.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileDbError`] for malformed JSON and entries without a
    /// command.
    pub fn from_json(text: &str, origin: &Utf8Path) -> Result<Self, CompileDbError> {
        let raw: Vec<RawEntry> =
            serde_json::from_str(text).map_err(|source| CompileDbError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        let entries = raw
            .into_iter()
            .map(|entry| CompileCommand::from_raw(entry, origin))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the database has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry for `source`, an absolute path.
    ///
    /// When a file has several entries the first one wins.
    #[must_use]
    pub fn lookup(&self, source: &Utf8Path) -> Option<&CompileCommand> {
        let wanted = normalize(source);
        self.entries.iter().find(|entry| entry.file == wanted)
    }
}

impl CompileCommand {
    fn from_raw(entry: RawEntry, origin: &Utf8Path) -> Result<Self, CompileDbError> {
        let arguments = match (entry.arguments, entry.command) {
            (Some(arguments), _) => arguments,
            (None, Some(command)) => shlex::split(&command).ok_or_else(|| {
                CompileDbError::MalformedCommand {
                    file: entry.file.clone(),
                }
            })?,
            (None, None) => {
                return Err(CompileDbError::MissingCommand {
                    path: origin.to_path_buf(),
                    file: entry.file,
                });
            }
        };
        let file = normalize(&entry.directory.join(&entry.file));
        Ok(Self {
            directory: entry.directory,
            file,
            arguments,
            output: entry.output,
        })
    }
}

/// How compile commands are obtained for the sources of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileCommands {
    /// Entries from a compilation database.
    Database(CompilationDatabase),
    /// One command line shared by every source (given after `--`), led by
    /// [`FIXED_DRIVER`].
    Fixed(Vec<String>),
    /// No commands; every source uses its extension default.
    None,
}

impl CompileCommands {
    /// Builds a fixed command from the compiler flags given after `--`.
    ///
    /// The flags carry no compiler driver, so [`FIXED_DRIVER`] is prepended.
    #[must_use]
    pub fn fixed(flags: &[String]) -> Self {
        let arguments = std::iter::once(FIXED_DRIVER.to_owned())
            .chain(flags.iter().cloned())
            .collect();
        Self::Fixed(arguments)
    }

    /// The command arguments for `source`, if any are known.
    #[must_use]
    pub fn arguments_for(&self, source: &Utf8Path) -> Option<&[String]> {
        match self {
            Self::Database(database) => database.lookup(source).map(CompileCommand::arguments),
            Self::Fixed(arguments) => Some(arguments),
            Self::None => None,
        }
    }
}

/// Picks the grammar a compile command asks for.
///
/// The compiler driver is considered first, then flags in order, so a later
/// `-x` or `-std=` wins over an earlier one. Returns `None` when the command
/// does not decide.
#[must_use]
pub fn language_from_arguments(arguments: &[String]) -> Option<SupportedLanguage> {
    let mut language = arguments.first().and_then(|driver| driver_language(driver));
    let mut words = arguments.iter().skip(1).map(String::as_str);
    while let Some(word) = words.next() {
        let selected = if word == "-x" {
            words.next().and_then(x_language)
        } else if let Some(value) = word.strip_prefix("-x") {
            x_language(value)
        } else if let Some(value) = word.strip_prefix("-std=") {
            std_language(value)
        } else {
            None
        };
        if selected.is_some() {
            language = selected;
        }
    }
    language
}

fn driver_language(driver: &str) -> Option<SupportedLanguage> {
    let name = Utf8Path::new(driver).file_name().unwrap_or(driver);
    // Versioned drivers such as `g++-13` and `clang++-17`.
    let base = name.split('-').next().unwrap_or(name);
    matches!(base, "clang++" | "g++" | "c++").then_some(SupportedLanguage::Cpp)
}

fn x_language(value: &str) -> Option<SupportedLanguage> {
    match value {
        "c++" | "c++-header" | "c++-cpp-output" => Some(SupportedLanguage::Cpp),
        "c" | "c-header" | "cpp-output" => Some(SupportedLanguage::C),
        _ => None,
    }
}

fn std_language(value: &str) -> Option<SupportedLanguage> {
    if value.starts_with("c++") || value.starts_with("gnu++") {
        Some(SupportedLanguage::Cpp)
    } else if value.starts_with('c') || value.starts_with("gnu") || value.starts_with("iso9899") {
        Some(SupportedLanguage::C)
    } else {
        None
    }
}

/// Removes `.` components and resolves `..` lexically.
#[must_use]
pub fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_owned()).collect()
    }

    fn command_arguments(command: &str) -> Result<Vec<String>, CompileDbError> {
        let json = serde_json::json!([{"directory": "/b", "file": "x.c", "command": command}]);
        let database = CompilationDatabase::from_json(&json.to_string(), Utf8Path::new("db.json"))?;
        Ok(database
            .lookup(Utf8Path::new("/b/x.c"))
            .expect("x.c entry")
            .arguments()
            .to_vec())
    }

    #[rstest]
    #[case("cc -c x.c", &["cc", "-c", "x.c"])]
    #[case("cc  -DNAME=\"a b\" x.c", &["cc", "-DNAME=a b", "x.c"])]
    #[case("cc -I'my dir' x.c", &["cc", "-Imy dir", "x.c"])]
    #[case("cc a\\ b.c x.c", &["cc", "a b.c", "x.c"])]
    #[case("cc -DEMPTY='' x.c", &["cc", "-DEMPTY=", "x.c"])]
    fn command_strings_split_into_shell_words(#[case] command: &str, #[case] expected: &[&str]) {
        assert_eq!(command_arguments(command).expect("splits"), words(expected));
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let err = command_arguments("cc \"oops x.c").expect_err("unterminated");
        assert!(matches!(err, CompileDbError::MalformedCommand { .. }));
    }

    #[rstest]
    #[case(&["clang++", "-c", "a.c"], Some(SupportedLanguage::Cpp))]
    #[case(&["/usr/bin/g++-13", "-c", "a.c"], Some(SupportedLanguage::Cpp))]
    #[case(&["cc", "-x", "c++", "a.c"], Some(SupportedLanguage::Cpp))]
    #[case(&["cc", "-xc++", "a.c"], Some(SupportedLanguage::Cpp))]
    #[case(&["cc", "-std=gnu++17", "a.c"], Some(SupportedLanguage::Cpp))]
    #[case(&["clang++", "-x", "c", "a.cc"], Some(SupportedLanguage::C))]
    #[case(&["g++", "-std=c++20", "-std=c11", "a.cc"], Some(SupportedLanguage::C))]
    #[case(&["cc", "-O2", "a.c"], None)]
    #[case(&[], None)]
    fn compile_flags_select_language(
        #[case] arguments: &[&str],
        #[case] expected: Option<SupportedLanguage>,
    ) {
        assert_eq!(language_from_arguments(&words(arguments)), expected);
    }

    #[test]
    fn entries_resolve_relative_files_against_directory() {
        let json = r#"[
            {"directory": "/build", "file": "../src/./a.c", "command": "cc -c ../src/a.c"},
            {"directory": "/build", "file": "/src/b.cc", "arguments": ["c++", "-c", "/src/b.cc"], "output": "b.o"}
        ]"#;
        let database =
            CompilationDatabase::from_json(json, Utf8Path::new("db.json")).expect("parses");
        assert_eq!(database.len(), 2);

        let a = database.lookup(Utf8Path::new("/src/a.c")).expect("a.c entry");
        assert_eq!(a.arguments(), words(&["cc", "-c", "../src/a.c"]).as_slice());
        assert_eq!(a.directory(), Utf8Path::new("/build"));

        let b = database.lookup(Utf8Path::new("/src/../src/b.cc")).expect("b.cc entry");
        assert_eq!(b.output(), Some(Utf8Path::new("b.o")));
        assert!(database.lookup(Utf8Path::new("/src/c.c")).is_none());
    }

    #[test]
    fn entry_without_command_is_rejected() {
        let json = r#"[{"directory": "/b", "file": "a.c"}]"#;
        let err = CompilationDatabase::from_json(json, Utf8Path::new("db.json"))
            .expect_err("no command");
        assert!(matches!(err, CompileDbError::MissingCommand { .. }));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = CompilationDatabase::from_json("{", Utf8Path::new("db.json"))
            .expect_err("bad json");
        assert!(matches!(err, CompileDbError::Parse { .. }));
    }

    #[test]
    fn discovery_walks_up_from_the_source_directory() {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp dir");
        let nested = root.join("src/deep");
        fs::create_dir_all(&nested).expect("create dirs");
        fs::write(
            root.join(DATABASE_FILE_NAME),
            r#"[{"directory": "/", "file": "/x.c", "command": "cc x.c"}]"#,
        )
        .expect("write database");

        let found = CompilationDatabase::discover(&nested)
            .expect("loads")
            .expect("found");
        assert_eq!(found.len(), 1);
        assert!(
            CompilationDatabase::discover(Utf8Path::new("/nonexistent/dir"))
                .expect("no error")
                .is_none()
        );
    }

    #[test]
    fn fixed_commands_apply_to_every_source() {
        let commands = CompileCommands::fixed(&words(&["-x", "c++"]));
        let arguments = commands
            .arguments_for(Utf8Path::new("/any.c"))
            .expect("fixed arguments");
        assert_eq!(arguments, words(&[FIXED_DRIVER, "-x", "c++"]).as_slice());
        assert_eq!(
            language_from_arguments(arguments),
            Some(SupportedLanguage::Cpp)
        );
        assert_eq!(CompileCommands::None.arguments_for(Utf8Path::new("/any.c")), None);
    }

    #[rstest]
    #[case("/a/./b/../c.c", "/a/c.c")]
    #[case("a/../../b.c", "../b.c")]
    fn normalizes_lexically(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(Utf8Path::new(input)), Utf8PathBuf::from(expected));
    }
}
