//! `saya image rm`: remove an image from the forge.

use tokio_util::sync::CancellationToken;

use crate::command::{RequestCtx, SayaCmd};
use crate::error::Result;
use crate::reference::Reference;

#[derive(Debug, Clone, Default)]
pub struct ImageRmRequest {
    pub ctx: RequestCtx,
    /// Image reference `name[:version]`; required.
    pub name: String,
    pub img_type: String,
    pub platform: String,
}

impl ImageRmRequest {
    pub fn to_cmd(&self) -> Result<SayaCmd> {
        let reference = Reference::parse(&self.name)?;
        let mut cmd = SayaCmd::subcommand(&self.ctx.exe, &["image", "rm"])?;
        cmd.with_ref(&reference.normalized());
        cmd.with_request_ctx(&self.ctx);
        cmd.flag_if_not_blank("--img-type", &self.img_type);
        cmd.flag_if_not_blank("--platform", &self.platform);
        Ok(cmd)
    }
}

/// No result file: the exit code is the whole answer.
pub async fn rm(cancel: &CancellationToken, req: ImageRmRequest) -> Result<()> {
    tracing::debug!(request = ?req, "image rm requested");
    let cmd = req.to_cmd()?;
    cmd.ensure_valid()?;
    let outcome = cmd.exec(cancel).await?;
    tracing::debug!(?outcome, "image rm execution outcome");
    Ok(())
}
