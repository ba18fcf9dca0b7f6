//! One module per operation of the external program.
//!
//! Every operation follows the same shape: a request struct exposing
//! `to_cmd` (pure command assembly, inspectable in tests) and an async
//! executor fn that runs the command and, where the operation produces one,
//! decodes the JSON result file.

pub mod img_ls;
pub mod img_meta;
pub mod img_pull;
pub mod img_rm;
pub mod vm_ls;
pub mod vm_rm;
pub mod vm_run;
pub mod vm_start;
pub mod vm_stop;
