//! Behavioural tests for configuration precedence.

use std::cell::RefCell;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use tprof_config::{
    Config, LOG_FILTER_ENV, LOG_FORMAT_ENV, LogFormat, WORKSPACE_ENV, WorkspaceSource,
    default_log_filter, default_log_format,
};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    temp_dir: TempDir,
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Result<Config, String>>>,
    _guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        let harness = Self {
            temp_dir,
            cli_args: RefCell::new(vec![OsString::from("struct-locator")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            _guard: guard,
        };
        for key in [LOG_FILTER_ENV, LOG_FORMAT_ENV, WORKSPACE_ENV] {
            harness.override_env(key, None);
        }
        harness
    }

    fn override_env(&self, key: &str, value: Option<&str>) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` under edition 2024; the mutex held
        // by the harness serialises it and `Drop` restores the old values.
        match value {
            Some(value) => unsafe { std::env::set_var(key, value) },
            None => unsafe { std::env::remove_var(key) },
        }
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() {
            return;
        }
        let args = self.cli_args.borrow().clone();
        let result = Config::load_from_iter(args).map_err(|error| error.to_string());
        *self.loaded.borrow_mut() = Some(result);
    }

    fn config(&self) -> Config {
        self.load();
        match self.loaded.borrow().as_ref() {
            Some(Ok(config)) => config.clone(),
            Some(Err(error)) => panic!("configuration failed to load: {error}"),
            None => panic!("configuration was not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            match value {
                Some(os_value) => unsafe { std::env::set_var(&key, os_value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("the environment sets \"{key}\" to \"{value}\"")]
fn given_environment(harness: &Harness, key: String, value: String) {
    harness.override_env(&key, Some(&value));
}

#[when("the CLI sets the log filter to \"{filter}\"")]
fn when_cli_filter(harness: &Harness, filter: String) {
    harness.push_cli_arg("--log-filter");
    harness.push_cli_arg(filter);
}

#[when("the CLI sets the workspace to \"{path}\"")]
fn when_cli_workspace(harness: &Harness, path: String) {
    harness.push_cli_arg("--workspace");
    harness.push_cli_arg(path);
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

#[then("loading the configuration applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let config = harness.config();
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());

    let cwd = harness.temp_dir.path().to_path_buf();
    let workspace = match config.resolve_workspace(|| Ok(cwd)) {
        Ok(workspace) => workspace,
        Err(error) => panic!("workspace failed to resolve: {error}"),
    };
    assert_eq!(workspace.source(), WorkspaceSource::CurrentDirectory);
    assert_eq!(workspace.path().as_std_path(), harness.temp_dir.path());
}

#[then("loading the configuration resolves the log filter to \"{filter}\"")]
fn then_resolved_filter(harness: &Harness, filter: String) {
    assert_eq!(harness.config().log_filter(), filter);
}

#[then("the log format is \"{format}\"")]
fn then_log_format(harness: &Harness, format: String) {
    let expected: LogFormat = match format.parse() {
        Ok(value) => value,
        Err(error) => panic!("invalid expected format '{format}': {error}"),
    };
    assert_eq!(harness.config().log_format(), expected);
}

#[then("loading the configuration resolves the workspace to \"{path}\"")]
fn then_resolved_workspace(harness: &Harness, path: String) {
    let workspace = match harness.config().workspace() {
        Ok(workspace) => workspace,
        Err(error) => panic!("workspace failed to resolve: {error}"),
    };
    assert_eq!(workspace.path().as_str(), path);
    assert_eq!(workspace.source(), WorkspaceSource::Configured);
}

#[then("loading the configuration fails")]
fn then_load_fails(harness: &Harness) {
    harness.load();
    match harness.loaded.borrow().as_ref() {
        Some(Err(message)) => assert!(!message.is_empty()),
        other => panic!("expected a load failure, got {other:?}"),
    }
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Defaults apply without overrides"
)]
fn defaults_apply(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Environment overrides the defaults"
)]
fn environment_overrides_defaults(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Command line overrides the environment"
)]
fn cli_overrides_environment(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Workspace comes from the environment"
)]
fn workspace_from_environment(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Command line workspace overrides the environment"
)]
fn cli_workspace_overrides_environment(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Malformed log format is rejected"
)]
fn malformed_log_format_rejected(#[from(harness)] harness: Harness) {
    let _ = harness;
}
