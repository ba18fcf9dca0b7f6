//! `saya vm run`: create and start a VM from an image reference.

use std::path::Path;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::command::{RequestCtx, SayaCmd};
use crate::error::{Result, SayaError};
use crate::result_file::{ResultDst, decode_json_file};

#[derive(Debug, Clone, Default)]
pub struct VmRunRequest {
    pub ctx: RequestCtx,
    pub name: String,
    /// Image reference the VM is created from; required.
    pub img_ref: String,
    pub compute_type: String,
    pub platform: String,
    pub img_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VmRunSsh {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub created_pwd_file: String,
    #[serde(default)]
    pub created_identity_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmRunResult {
    pub id: String,
    pub name: String,
    pub os_variant: String,
    pub ssh: VmRunSsh,
}

// e.g. {"id":"81e4b6cf-ad66-409d-8a78-429b7499093e",
// "name":"saya-2023-08-04T20-39-47Z-999d5a49cbbf",
// "ssh":{"ip":"192.168.56.253","port":22,"user":"root"}}
#[derive(Debug, Clone, Default, Deserialize)]
struct VmRunCmdRes {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    os_variant: String,
    #[serde(default)]
    ssh: Option<VmRunSsh>,
}

impl From<VmRunCmdRes> for VmRunResult {
    fn from(res: VmRunCmdRes) -> Self {
        Self {
            id: res.id,
            name: res.name,
            os_variant: res.os_variant,
            ssh: res.ssh.unwrap_or_default(),
        }
    }
}

impl VmRunRequest {
    pub fn to_cmd(&self, result_dst: &Path) -> Result<SayaCmd> {
        let img_ref = self.img_ref.trim();
        if img_ref.is_empty() {
            return Err(SayaError::Input(
                "image reference must not be blank".to_string(),
            ));
        }
        let mut cmd = SayaCmd::subcommand(&self.ctx.exe, &["vm", "run"])?;
        cmd.with_ref(img_ref);
        cmd.with_request_ctx(&self.ctx);

        cmd.flag_if_not_blank("--name", &self.name);
        cmd.flag_if_not_blank("--compute-type", &self.compute_type);
        cmd.flag_if_not_blank("--platform", &self.platform);
        cmd.flag_if_not_blank("--img-type", &self.img_type);
        cmd.flag_if_not_blank("--result-dst", &result_dst.to_string_lossy());
        Ok(cmd)
    }
}

pub async fn run(cancel: &CancellationToken, req: VmRunRequest) -> Result<VmRunResult> {
    let result_dst = ResultDst::new()?;
    let cmd = req.to_cmd(result_dst.path())?;
    cmd.ensure_valid()?;
    let outcome = cmd.exec(cancel).await?;
    tracing::debug!(?outcome, "vm run execution outcome");

    let res: VmRunCmdRes = decode_json_file("vm run", result_dst.path()).await?;
    Ok(VmRunResult::from(res))
}
