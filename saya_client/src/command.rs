//! Command assembly and execution for the external `saya` program.
//!
//! [`SayaCmd`] owns the argument collection for exactly one invocation: it
//! is seeded with the subcommand tokens (e.g. `image ls`), fed the shared
//! request context flags, then operation-specific flags, and finally
//! executed. Flag helpers do not fail hard on bad input; they accumulate
//! validation errors that callers inspect (via [`SayaCmd::ensure_valid`])
//! before running the program.
//!
//! Execution is a single attempt: spawn, wait, capture stdout and stderr
//! separately, classify the exit. No retry happens here; convergence
//! waiting belongs to [`crate::poll`].

use std::process::Stdio;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::args::{CmdArg, CmdArgs};
use crate::error::{EXIT_CODE_UNKNOWN, ExecError, Result, SayaError};
use crate::opaque::Opaque;

/// Shared per-request execution context for the external program.
#[derive(Debug, Clone, Default)]
pub struct RequestCtx {
    /// saya executable command or path.
    pub exe: String,
    /// saya configuration file path.
    pub config: String,
    /// forge (local image store) location.
    pub forge: String,
    pub license_key: Opaque,
    /// log level error|warn|info|debug|trace.
    pub log_level: String,
}

/// Captured result of one invocation attempt, successful or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// A single invocation of the external program under assembly.
#[derive(Debug, Clone)]
pub struct SayaCmd {
    exe: String,
    pub args: CmdArgs,
    validation_errors: Vec<String>,
}

impl SayaCmd {
    pub fn new(exe: &str) -> Result<Self> {
        let exe = exe.trim();
        if exe.is_empty() {
            return Err(SayaError::Input("saya exe must not be blank".to_string()));
        }
        Ok(Self {
            exe: exe.to_string(),
            args: CmdArgs::default(),
            validation_errors: Vec::new(),
        })
    }

    /// Creates a command seeded with the given subcommand tokens, e.g.
    /// `["image", "ls"]`.
    pub fn subcommand(exe: &str, tokens: &[&str]) -> Result<Self> {
        let mut cmd = Self::new(exe)?;
        for token in tokens {
            cmd.args.append_flag(*token);
        }
        Ok(cmd)
    }

    pub fn exe(&self) -> &str {
        &self.exe
    }

    /// Appends the shared context flags: `--config`, `--forge`,
    /// `--license-key` and `--log-level`, each only when non-blank.
    pub fn with_request_ctx(&mut self, ctx: &RequestCtx) {
        self.with_cfg_file(&ctx.config);
        self.with_forge_location(&ctx.forge);
        self.with_license_key(&ctx.license_key);
        self.with_log_level(&ctx.log_level);
    }

    pub fn with_cfg_file(&mut self, cfg: &str) {
        let cfg = cfg.trim();
        if cfg.is_empty() {
            return;
        }
        self.args.append("--config", cfg);
    }

    pub fn with_forge_location(&mut self, forge_location: &str) {
        let forge_location = forge_location.trim();
        if forge_location.is_empty() {
            return;
        }
        self.args.append("--forge", forge_location);
    }

    pub fn with_license_key(&mut self, license_key: &Opaque) {
        let val = license_key.value().trim();
        if val.is_empty() {
            return;
        }
        self.args
            .append_arg(CmdArg::opaque("--license-key", Opaque::new(val)));
    }

    pub fn with_log_level(&mut self, log_level: &str) {
        let log_level = log_level.trim();
        if log_level.is_empty() {
            return;
        }
        self.args.append("--log-level", log_level);
    }

    /// Appends a positional reference token (image reference, vm id).
    /// A blank reference is recorded as a validation error.
    pub fn with_ref(&mut self, reference: &str) {
        let reference = reference.trim();
        if reference.is_empty() {
            self.validation_errors
                .push("reference must not be blank".to_string());
            return;
        }
        self.args.append_flag(reference);
    }

    pub fn flag_if_not_blank(&mut self, key: &str, val: &str) {
        let val = val.trim();
        if val.is_empty() {
            return;
        }
        let key = key.trim();
        if key.is_empty() {
            self.validation_errors
                .push(format!("flag key must not be blank: value={val}"));
            return;
        }
        self.args.append(key, val);
    }

    /// Appends a secret-bearing flag; the value only ever appears raw in the
    /// exec-form argument vector.
    pub fn opaque_flag_if_not_blank(&mut self, key: &str, val: &Opaque) {
        let val = val.value().trim();
        if val.is_empty() {
            return;
        }
        let key = key.trim();
        if key.is_empty() {
            self.validation_errors
                .push("opaque flag key must not be blank".to_string());
            return;
        }
        self.args.append_arg(CmdArg::opaque(key, Opaque::new(val)));
    }

    pub fn multi_flag_if_not_empty(&mut self, key: &str, values: &[String]) {
        if values.is_empty() {
            return;
        }
        let key = key.trim();
        if key.is_empty() {
            self.validation_errors
                .push(format!("multi flag key must not be blank: values={values:?}"));
            return;
        }

        let normalized: Vec<String> = values
            .iter()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .collect();
        if normalized.len() != values.len() {
            self.validation_errors.push(format!(
                "blank value not supported for multi flag: key={key} values={values:?}"
            ));
            return;
        }

        self.args.append_arg(CmdArg::multi(key, normalized));
    }

    /// Validation issues accumulated so far, for pre-execution inspection.
    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    pub fn ensure_valid(&self) -> Result<()> {
        if self.validation_errors.is_empty() {
            return Ok(());
        }
        Err(SayaError::Validation {
            issues: self.validation_errors.clone(),
        })
    }

    /// Runs the external program with the resolved argument vector.
    ///
    /// Exactly one attempt. Stdout and stderr are captured separately; the
    /// exit code is `0` on clean success, the recovered process code on
    /// failure, or [`EXIT_CODE_UNKNOWN`] when it cannot be determined. On
    /// failure the returned error carries the program, the redacted
    /// argument vector, the working directory and the captured output.
    /// Cancelling the token kills the subprocess and yields
    /// [`SayaError::Cancelled`].
    pub async fn exec(&self, cancel: &CancellationToken) -> Result<ExecOutcome> {
        let exec_args = self.args.exec_args();
        tracing::debug!(
            program = %self.exe,
            args = ?self.args.display_args(),
            "executing saya command"
        );

        let mut command = Command::new(&self.exe);
        command
            .args(&exec_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(SayaError::Cancelled { program: self.exe.clone() });
            }
            output = command.output() => output,
        };

        match output {
            Ok(output) => {
                let outcome = ExecOutcome {
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    exit_code: output.status.code().unwrap_or(EXIT_CODE_UNKNOWN),
                };
                if output.status.success() {
                    Ok(outcome)
                } else {
                    Err(self.exec_error(outcome, None).into())
                }
            }
            Err(err) => {
                let outcome = ExecOutcome {
                    exit_code: EXIT_CODE_UNKNOWN,
                    ..ExecOutcome::default()
                };
                Err(self.exec_error(outcome, Some(err)).into())
            }
        }
    }

    fn exec_error(&self, outcome: ExecOutcome, source: Option<std::io::Error>) -> Box<ExecError> {
        Box::new(ExecError {
            program: self.exe.clone(),
            args_display: self.args.display_args(),
            cwd: std::env::current_dir().unwrap_or_default(),
            exit_code: outcome.exit_code,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            source,
        })
    }
}
