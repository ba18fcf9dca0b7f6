//! `saya vm stop`: stop a running VM.

use tokio_util::sync::CancellationToken;

use crate::command::{RequestCtx, SayaCmd};
use crate::error::{Result, SayaError};

#[derive(Debug, Clone, Default)]
pub struct VmStopRequest {
    pub ctx: RequestCtx,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmStopResult {
    pub id: String,
}

impl VmStopRequest {
    pub fn to_cmd(&self) -> Result<SayaCmd> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(SayaError::Input("vm id must not be blank".to_string()));
        }
        let mut cmd = SayaCmd::subcommand(&self.ctx.exe, &["vm", "stop"])?;
        cmd.with_ref(id);
        cmd.with_request_ctx(&self.ctx);
        Ok(cmd)
    }
}

pub async fn stop(cancel: &CancellationToken, req: VmStopRequest) -> Result<VmStopResult> {
    let cmd = req.to_cmd()?;
    cmd.ensure_valid()?;
    let outcome = cmd.exec(cancel).await?;
    tracing::debug!(?outcome, "vm stop execution outcome");
    Ok(VmStopResult { id: req.id })
}
