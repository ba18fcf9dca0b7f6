//! Error types for the saya client.
//!
//! Each failure class gets its own variant so callers can tell a
//! pre-execution validation problem from an execution failure from a
//! malformed result file. Errors are enriched with context at the point of
//! origin and passed upward unchanged. The polling combinator carries its
//! own error enum in [`crate::poll`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::string::{indent_n, truncate};

pub type Result<T> = std::result::Result<T, SayaError>;

#[derive(Error, Debug)]
pub enum SayaError {
    /// A required input was blank or malformed before any command was built.
    #[error("invalid request input: {0}")]
    Input(String),

    /// Validation issues accumulated while assembling command arguments.
    #[error("invalid command arguments: {}", .issues.join("; "))]
    Validation { issues: Vec<String> },

    /// The external program could not be started or exited non-zero.
    #[error("{0}")]
    Exec(#[from] Box<ExecError>),

    /// The execution was cancelled before the program completed.
    #[error("command execution cancelled: program={program}")]
    Cancelled { program: String },

    #[error("fail to read result file: path={path}")]
    ResultFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fail to decode json result file: path={path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad image reference format: expected=name[:tag], got={0}")]
    BadReference(String),

    #[error("bad platform format: expected=os/arch[/variant], got={0}")]
    BadPlatform(String),

    #[error("bad image id format: expected=platform:name:version:type, got={0}")]
    BadImgId(String),
}

/// Exit code reported when the real one cannot be determined, e.g. the
/// process never started or was killed by a signal.
pub const EXIT_CODE_UNKNOWN: i32 = -777;

const STDERR_DIAG_LIMIT: usize = 512;

/// Diagnostic context for a failed execution of the external program.
///
/// Argument tokens are the display rendering: secrets are already redacted
/// and the whole error is safe to log.
#[derive(Debug)]
pub struct ExecError {
    pub program: String,
    pub args_display: Vec<String>,
    pub cwd: PathBuf,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub source: Option<std::io::Error>,
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cause = match &self.source {
            Some(err) => err.to_string(),
            None => format!("exit code {}", self.exit_code),
        };
        write!(
            f,
            "fail to execute command:\
             \n\tcommand={} \n\targs={:?} \n\tpwd={} \n\texit-code={} \n\tcause={} \
             \n\tstdout=\n{} \n\tstderr=\n{}",
            self.program,
            self.args_display,
            self.cwd.display(),
            self.exit_code,
            cause,
            indent_n(3, &self.stdout),
            indent_n(3, &truncate(&self.stderr, STDERR_DIAG_LIMIT)),
        )
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}
