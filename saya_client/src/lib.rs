//! # saya_client
//!
//! Client library driving the external `saya` image and VM management CLI.
//!
//! The crate mediates between a declarative request model and the external
//! executable: request structs are translated into a deterministic argument
//! vector ([`args`]), secrets stay redacted everywhere but the real process
//! arguments ([`opaque`]), the program is executed with its output captured
//! and classified ([`command`]), and asynchronous state convergence is
//! awaited with a bounded-retry loop ([`poll`]).
//!
//! ## Execution Flow
//!
//! 1. A caller fills a request struct (e.g. [`ops::img_ls::LsRequest`]).
//! 2. The operation seeds a [`command::SayaCmd`] with the subcommand tokens
//!    and translates the request fields into argument declarations.
//! 3. [`command::SayaCmd::exec`] resolves the collection into the final
//!    argument vector and runs the program under a cancellation token.
//! 4. Where the operation produces a result file, it is decoded from JSON
//!    ([`result_file`]) and mapped onto a plain result struct.
//! 5. Callers waiting for a state change drive an operation through
//!    [`poll::Poller`] until a target state is observed.
//!
//! Each invocation owns its argument collection and result-file path
//! exclusively; nothing is shared between concurrent callers.

pub mod args;
pub mod command;
pub mod error;
pub mod opaque;
pub mod ops;
pub mod platform;
pub mod poll;
pub mod reference;
pub mod repo;
pub mod result_file;
pub mod util;

pub use command::{ExecOutcome, RequestCtx, SayaCmd};
pub use error::{Result, SayaError};
pub use opaque::Opaque;
