//! Command argument model and deterministic assembly.
//!
//! A [`CmdArg`] declares a single command-line argument: a key, zero or more
//! values, an optional custom rendering, and a deletion marker. [`CmdArgs`]
//! collects declarations in two layers, a base list and an override list,
//! and resolves them into one argument vector.
//!
//! ## Resolution
//!
//! The resolution is deterministic and is the sole source of argument
//! ordering:
//!
//! 1. Scan the base list, then the override list.
//! 2. The first time a key is seen, its position in the output is fixed.
//! 3. The variant used for a key is the last one scanned (overrides are
//!    scanned second, so an override always wins the value, but not the
//!    position, over a base definition of the same key).
//! 4. A variant whose final mapping is marked deleted emits nothing, which
//!    lets an override suppress a base flag entirely.
//!
//! Duplicate definitions within one layer are not an error; the later one
//! silently wins.
//!
//! Two renderings exist: the exec form carries raw secret values for the
//! real process argument vector, the display form replaces them with the
//! mask and is the only form allowed in logs and error messages.

use std::collections::HashMap;

use crate::opaque::Opaque;

/// Custom rendering of a key/value pair into tokens, e.g. `key=value` joined
/// forms instead of the default `[key, value]`.
pub type RenderFn = fn(key: &str, value: &str) -> Vec<String>;

/// One command-line argument declaration.
///
/// The set of variants is closed: a plain string argument, a secret-bearing
/// argument, and a repeatable multi-value argument.
#[derive(Debug, Clone)]
pub enum CmdArg {
    /// A flag with an optional value. `value: None` renders just the key
    /// token (a boolean/no-value flag); an empty string is a valid value
    /// distinct from `None`.
    Str {
        key: String,
        value: Option<String>,
        render: Option<RenderFn>,
        deleted: bool,
    },
    /// Like [`CmdArg::Str`] but the value is an [`Opaque`] secret: exec-form
    /// rendering unwraps it, display-form rendering emits the mask.
    Opaque {
        key: String,
        value: Option<Opaque>,
        render: Option<RenderFn>,
        deleted: bool,
    },
    /// A repeatable flag. Each value renders independently under the same
    /// key, in insertion order.
    Multi {
        key: String,
        values: Vec<String>,
        render: Option<RenderFn>,
        deleted: bool,
    },
}

impl CmdArg {
    /// A no-value flag (or a positional token).
    pub fn flag(key: impl Into<String>) -> Self {
        CmdArg::Str {
            key: key.into(),
            value: None,
            render: None,
            deleted: false,
        }
    }

    /// A `key value` pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        CmdArg::Str {
            key: key.into(),
            value: Some(value.into()),
            render: None,
            deleted: false,
        }
    }

    /// A deleted marker for `key`: retained in the collection to suppress
    /// any other definition of the same key, contributes no tokens.
    pub fn deleted(key: impl Into<String>) -> Self {
        CmdArg::Str {
            key: key.into(),
            value: None,
            render: None,
            deleted: true,
        }
    }

    /// A secret-bearing `key value` pair.
    pub fn opaque(key: impl Into<String>, value: Opaque) -> Self {
        CmdArg::Opaque {
            key: key.into(),
            value: Some(value),
            render: None,
            deleted: false,
        }
    }

    /// A repeatable flag with the given values.
    pub fn multi(key: impl Into<String>, values: Vec<String>) -> Self {
        CmdArg::Multi {
            key: key.into(),
            values,
            render: None,
            deleted: false,
        }
    }

    pub fn with_render(mut self, render_fn: RenderFn) -> Self {
        match &mut self {
            CmdArg::Str { render, .. }
            | CmdArg::Opaque { render, .. }
            | CmdArg::Multi { render, .. } => *render = Some(render_fn),
        }
        self
    }

    pub fn key(&self) -> &str {
        match self {
            CmdArg::Str { key, .. } | CmdArg::Opaque { key, .. } | CmdArg::Multi { key, .. } => key,
        }
    }

    pub fn is_deleted(&self) -> bool {
        match self {
            CmdArg::Str { deleted, .. }
            | CmdArg::Opaque { deleted, .. }
            | CmdArg::Multi { deleted, .. } => *deleted,
        }
    }

    /// Tokens for the real process argument vector; secrets are unwrapped.
    pub fn exec_tokens(&self) -> Vec<String> {
        match self {
            CmdArg::Str { key, value, render, .. } => render_pair(key, value.as_deref(), *render),
            CmdArg::Opaque { key, value, render, .. } => {
                render_pair(key, value.as_ref().map(Opaque::value), *render)
            }
            CmdArg::Multi { key, values, render, .. } => render_multi(key, values, *render),
        }
    }

    /// Tokens for display and diagnostics; identical to [`Self::exec_tokens`]
    /// except secret values render as the mask.
    pub fn display_tokens(&self) -> Vec<String> {
        match self {
            CmdArg::Opaque { key, value, render, .. } => {
                let masked = value.as_ref().map(|v| v.to_string());
                render_pair(key, masked.as_deref(), *render)
            }
            _ => self.exec_tokens(),
        }
    }
}

fn render_pair(key: &str, value: Option<&str>, render: Option<RenderFn>) -> Vec<String> {
    match (value, render) {
        (None, _) => vec![key.to_string()],
        (Some(value), None) => vec![key.to_string(), value.to_string()],
        (Some(value), Some(render)) => render(key, value),
    }
}

fn render_multi(key: &str, values: &[String], render: Option<RenderFn>) -> Vec<String> {
    if values.is_empty() {
        return vec![key.to_string()];
    }
    let mut tokens = Vec::with_capacity(values.len() * 2);
    for value in values {
        match render {
            None => {
                tokens.push(key.to_string());
                tokens.push(value.clone());
            }
            Some(render) => tokens.extend(render(key, value)),
        }
    }
    tokens
}

/// An ordered collection of argument declarations plus an override layer.
#[derive(Debug, Clone, Default)]
pub struct CmdArgs {
    args: Vec<CmdArg>,
    overrides: Vec<CmdArg>,
}

impl CmdArgs {
    /// Appends a `key value` pair to the base list.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.args.push(CmdArg::new(key, value));
    }

    /// Appends a no-value flag (or positional token) to the base list.
    pub fn append_flag(&mut self, key: impl Into<String>) {
        self.args.push(CmdArg::flag(key));
    }

    pub fn append_arg(&mut self, arg: CmdArg) {
        self.args.push(arg);
    }

    pub fn append_override(&mut self, arg: CmdArg) {
        self.overrides.push(arg);
    }

    /// Resolves the collection into the exec-form argument vector.
    ///
    /// Multiple occurrences of a key are not supported; the last definition
    /// wins (see the module docs for the full algorithm).
    pub fn exec_args(&self) -> Vec<String> {
        self.args_by(CmdArg::exec_tokens)
    }

    /// Resolves the collection into the secret-redacted display vector.
    pub fn display_args(&self) -> Vec<String> {
        self.args_by(CmdArg::display_tokens)
    }

    fn args_by(&self, to_tokens: fn(&CmdArg) -> Vec<String>) -> Vec<String> {
        let capacity = self.args.len() + self.overrides.len();
        let mut by_key: HashMap<&str, &CmdArg> = HashMap::with_capacity(capacity);
        let mut key_order: Vec<&str> = Vec::with_capacity(capacity);
        for arg in self.args.iter().chain(self.overrides.iter()) {
            let key = arg.key();
            if !by_key.contains_key(key) {
                key_order.push(key);
            }
            by_key.insert(key, arg);
        }

        let mut tokens = Vec::with_capacity(key_order.len());
        for key in key_order {
            let arg = by_key[key];
            if arg.is_deleted() {
                continue;
            }
            tokens.extend(to_tokens(arg));
        }
        tokens
    }
}
