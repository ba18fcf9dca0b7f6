//! `saya vm rm`: remove a VM.

use tokio_util::sync::CancellationToken;

use crate::command::{RequestCtx, SayaCmd};
use crate::error::{Result, SayaError};

#[derive(Debug, Clone, Default)]
pub struct VmRmRequest {
    pub ctx: RequestCtx,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmRmResult {
    pub id: String,
}

impl VmRmRequest {
    pub fn to_cmd(&self) -> Result<SayaCmd> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(SayaError::Input("vm id must not be blank".to_string()));
        }
        let mut cmd = SayaCmd::subcommand(&self.ctx.exe, &["vm", "rm"])?;
        cmd.with_ref(id);
        cmd.with_request_ctx(&self.ctx);
        Ok(cmd)
    }
}

pub async fn rm(cancel: &CancellationToken, req: VmRmRequest) -> Result<VmRmResult> {
    let cmd = req.to_cmd()?;
    cmd.ensure_valid()?;
    let outcome = cmd.exec(cancel).await?;
    tracing::debug!(?outcome, "vm rm execution outcome");
    Ok(VmRmResult { id: req.id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_cmd_token_sequence() {
        let req = VmRmRequest {
            ctx: RequestCtx {
                exe: "saya".to_string(),
                ..RequestCtx::default()
            },
            id: "vm-1".to_string(),
        };
        let cmd = req.to_cmd().unwrap();
        assert_eq!(cmd.args.exec_args(), vec!["vm", "rm", "vm-1"]);
    }
}
