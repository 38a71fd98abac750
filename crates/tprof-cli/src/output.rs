//! Output sinks for the two tools.
//!
//! `struct-locator` writes one `<identifier>.cst` file per function into the
//! workspace directory; `brace-guard` writes one patched copy of each input
//! next to it.

use std::collections::HashSet;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

use tprof_analysis::{FunctionRecord, RecordSink};

const OUTPUT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::output");

/// Suffix inserted between an input's file name and its repeated extension.
pub const PATCHED_SUFFIX: &str = "_tprof_subs";

/// Extension of per-function structural records.
pub const RECORD_EXTENSION: &str = "cst";

/// Errors raised while writing tool output.
#[derive(Debug, Error)]
pub enum SinkError {
    /// A record with the same identifier was already written in this run.
    #[error("duplicate function identifier '{identifier}'")]
    Duplicate {
        /// The repeated identifier.
        identifier: String,
    },

    /// The output file could not be written.
    #[error("failed to write '{path}': {source}")]
    Write {
        /// Path of the output file.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Writes each [`FunctionRecord`] to `<directory>/<identifier>.cst`.
///
/// Identifiers must be unique for the lifetime of the sink: a repeated one is
/// rejected rather than overwriting the earlier record.
#[derive(Debug)]
pub struct CstDirectorySink {
    directory: Utf8PathBuf,
    written: HashSet<String>,
}

impl CstDirectorySink {
    /// Creates a sink writing into `directory`.
    #[must_use]
    pub fn new(directory: impl Into<Utf8PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            written: HashSet::new(),
        }
    }

    /// The output directory.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Number of records written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written.len()
    }

    /// Path a record with `identifier` is written to.
    #[must_use]
    pub fn record_path(&self, identifier: &str) -> Utf8PathBuf {
        self.directory
            .join(format!("{identifier}.{RECORD_EXTENSION}"))
    }
}

impl RecordSink<FunctionRecord> for CstDirectorySink {
    type Error = SinkError;

    fn accept(&mut self, record: FunctionRecord) -> Result<(), Self::Error> {
        if self.written.contains(record.identifier()) {
            return Err(SinkError::Duplicate {
                identifier: record.identifier().to_owned(),
            });
        }

        let path = self.record_path(record.identifier());
        fs::write(&path, record.to_string())
            .map_err(|source| SinkError::Write { path: path.clone(), source })?;
        debug!(
            target: OUTPUT_TARGET,
            path = %path,
            facts = record.facts().len(),
            "record written"
        );
        self.written.insert(record.identifier().to_owned());
        Ok(())
    }
}

/// Path of the patched copy of `source`.
///
/// The whole file name is kept and the extension repeated after the suffix,
/// so `dir/foo.c` becomes `dir/foo.c_tprof_subs.c`. A source without an
/// extension gets the bare suffix.
#[must_use]
pub fn patched_path(source: &Utf8Path) -> Utf8PathBuf {
    let name = source.file_name().unwrap_or(source.as_str());
    let patched = match source.extension() {
        Some(extension) => format!("{name}{PATCHED_SUFFIX}.{extension}"),
        None => format!("{name}{PATCHED_SUFFIX}"),
    };
    source.with_file_name(patched)
}

/// Writes `text` to the patched path of `source`, returning that path.
///
/// # Errors
///
/// Returns [`SinkError::Write`] when the file cannot be written.
pub fn write_patched(source: &Utf8Path, text: &str) -> Result<Utf8PathBuf, SinkError> {
    let path = patched_path(source);
    fs::write(&path, text).map_err(|error| SinkError::Write {
        path: path.clone(),
        source: error,
    })?;
    debug!(target: OUTPUT_TARGET, path = %path, "patched source written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use rstest::rstest;
    use tprof_analysis::Fact;

    fn temp_sink() -> (tempfile::TempDir, CstDirectorySink) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        (dir, CstDirectorySink::new(path))
    }

    fn record(identifier: &str) -> FunctionRecord {
        FunctionRecord::new(
            identifier.to_owned(),
            "src/run.c".to_owned(),
            vec![
                Fact::Loop {
                    start_line: 3,
                    end_line: 5,
                },
                Fact::Call {
                    callee: "work".to_owned(),
                    start_line: 4,
                    end_line: 4,
                },
            ],
        )
    }

    #[rstest]
    #[case("dir/foo.c", "dir/foo.c_tprof_subs.c")]
    #[case("foo.cpp", "foo.cpp_tprof_subs.cpp")]
    #[case("/abs/x.tar.cc", "/abs/x.tar.cc_tprof_subs.cc")]
    #[case("dir/Makefile", "dir/Makefile_tprof_subs")]
    fn patched_path_repeats_extension(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(patched_path(Utf8Path::new(source)), Utf8PathBuf::from(expected));
    }

    #[test]
    fn records_are_written_per_identifier() {
        let (_dir, mut sink) = temp_sink();
        sink.accept(record("_Z3runi")).expect("first record");

        let text = fs::read_to_string(sink.record_path("_Z3runi")).expect("record file");
        assert_snapshot!(text, @r"
        _Z3runi
        src/run.c
        LOOP LOOP 3 5
        CALL work 4 4
        ");
        assert_eq!(sink.written(), 1);
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let (_dir, mut sink) = temp_sink();
        sink.accept(record("main")).expect("first record");
        let err = sink.accept(record("main")).expect_err("duplicate");
        assert!(matches!(err, SinkError::Duplicate { ref identifier } if identifier == "main"));
        assert_eq!(sink.written(), 1);
    }

    #[test]
    fn unwritable_directory_fails_the_record() {
        let (dir, _) = temp_sink();
        let missing = Utf8PathBuf::from_path_buf(dir.path().join("absent")).expect("utf-8");
        let mut sink = CstDirectorySink::new(missing);
        let err = sink.accept(record("f")).expect_err("missing directory");
        assert!(matches!(err, SinkError::Write { .. }));
        assert_eq!(sink.written(), 0);
    }
}
