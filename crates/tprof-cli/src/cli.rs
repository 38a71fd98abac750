//! Command-line argument definitions shared by both tools.

use camino::Utf8PathBuf;
use clap::Parser;

use tprof_config::ConfigOverrides;

/// Which instrumentation tool is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Wraps single-statement loop and branch bodies in braces.
    BraceGuard,
    /// Writes per-function loop and call-site records.
    StructLocator,
}

impl Tool {
    /// The binary name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BraceGuard => "brace-guard",
            Self::StructLocator => "struct-locator",
        }
    }

    /// One-line description shown in `--help`.
    #[must_use]
    pub const fn about(self) -> &'static str {
        match self {
            Self::BraceGuard => {
                "Guards single-statement loop and branch bodies with braces, writing \
                 <file>_tprof_subs.<ext> next to each source"
            }
            Self::StructLocator => {
                "Writes one <identifier>.cst record of loop ranges and call sites per \
                 function into $TPROF_WORKSPACE"
            }
        }
    }
}

/// Arguments accepted by both tools.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cli {
    /// Directory containing `compile_commands.json`.
    #[arg(short = 'p', value_name = "BUILD_PATH")]
    pub(crate) build_path: Option<Utf8PathBuf>,
    /// Additional argument appended to each compile command.
    #[arg(long = "extra-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub(crate) extra_args: Vec<String>,
    /// Additional argument prepended to each compile command.
    #[arg(
        long = "extra-arg-before",
        value_name = "ARG",
        allow_hyphen_values = true
    )]
    pub(crate) extra_args_before: Vec<String>,
    /// Configuration flags forwarded to the loader.
    #[command(flatten)]
    pub(crate) config: ConfigOverrides,
    /// Source files to process.
    #[arg(value_name = "SOURCE", required = true)]
    pub(crate) sources: Vec<Utf8PathBuf>,
    /// Compile command used for every source instead of a compilation
    /// database.
    #[arg(last = true, value_name = "COMPILER_ARG")]
    pub(crate) compiler_args: Vec<String>,
}
