//! Shared fixtures for in-process runs of the tools.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use tprof_config::Config;

use crate::config::ConfigLoader;
use crate::errors::AppError;
use crate::{IoStreams, Tool, run_with_loader};

/// Returns a fixed configuration and records the arguments it was given.
pub(super) struct StaticConfigLoader {
    config: Config,
    arguments: RefCell<Vec<OsString>>,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self {
            config,
            arguments: RefCell::new(Vec::new()),
        }
    }

    /// Arguments forwarded by the most recent load.
    pub(super) fn arguments(&self) -> Vec<String> {
        self.arguments
            .borrow()
            .iter()
            .map(|argument| argument.to_string_lossy().into_owned())
            .collect()
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        *self.arguments.borrow_mut() = args.to_vec();
        Ok(self.config.clone())
    }
}

/// A temporary source tree with a separate record workspace.
pub(super) struct Sandbox {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Sandbox {
    pub(super) fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        fs::create_dir(root.join("workspace")).expect("workspace dir");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn workspace(&self) -> Utf8PathBuf {
        self.root.join("workspace")
    }

    pub(super) fn write(&self, name: &str, text: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, text).expect("write source");
        path
    }

    pub(super) fn read(&self, path: &Utf8Path) -> String {
        fs::read_to_string(path).expect("read output")
    }

    /// Sorted file names in the workspace.
    pub(super) fn records(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.workspace())
            .expect("list workspace")
            .map(|entry| {
                entry
                    .expect("workspace entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    pub(super) fn config(&self) -> Config {
        Config {
            workspace: Some(self.workspace()),
            ..Config::default()
        }
    }
}

/// Captured result of one in-process run.
pub(super) struct RunOutput {
    pub(super) exit_code: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

pub(super) fn run_tool(tool: Tool, config: Config, args: &[&str]) -> RunOutput {
    run_tool_with(tool, &StaticConfigLoader::new(config), args)
}

pub(super) fn run_tool_with<L: ConfigLoader>(tool: Tool, loader: &L, args: &[&str]) -> RunOutput {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let argv = std::iter::once(OsString::from(tool.name()))
        .chain(args.iter().map(OsString::from))
        .collect::<Vec<_>>();
    let exit_code = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        run_with_loader(tool, argv, &mut io, loader)
    };
    RunOutput {
        exit_code,
        stdout: String::from_utf8(stdout).expect("stdout utf-8"),
        stderr: String::from_utf8(stderr).expect("stderr utf-8"),
    }
}
