//! `saya vm ls`: list VMs, optionally narrowed to one id.

use std::path::Path;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::command::{RequestCtx, SayaCmd};
use crate::error::Result;
use crate::reference::Reference;
use crate::result_file::{ResultDst, decode_json_file};

#[derive(Debug, Clone, Default)]
pub struct VmLsRequest {
    pub ctx: RequestCtx,
    /// VM id; passing one narrows the listing to at most one VM.
    pub id: String,
    pub name: String,
    /// Image reference the VM was created from; matched client-side
    /// against the base image.
    pub img_ref: String,
    pub compute_type: String,
    pub os_variant: String,
    /// Matched client-side against the reported VM state.
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmLsResult {
    pub id: String,
    pub name: String,
    pub arch: String,
    pub os: String,
    pub os_variant: String,
    /// Format: `webserver:v1:ova`.
    pub base_img: String,
    pub compute_type: String,
    pub state: String,
}

impl VmLsResult {
    pub fn platform(&self) -> String {
        format!("{}/{}", self.os, self.arch)
    }

    /// The image id of the base image: `platform:name:version:type`.
    pub fn img_id(&self) -> String {
        format!("{}:{}", self.platform(), self.base_img)
    }

    pub fn label_name_and_id(&self) -> String {
        format!("{}({})", self.name, self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VmLsCmdRes {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    arch: String,
    #[serde(default)]
    os: String,
    #[serde(default)]
    os_variant: String,
    #[serde(default)]
    base_img: String,
    #[serde(default)]
    compute_type: String,
    #[serde(default)]
    status: String,
}

impl From<VmLsCmdRes> for VmLsResult {
    fn from(res: VmLsCmdRes) -> Self {
        Self {
            id: res.id,
            name: res.name,
            arch: res.arch,
            os: res.os,
            os_variant: res.os_variant,
            base_img: res.base_img,
            compute_type: res.compute_type,
            state: res.status,
        }
    }
}

impl VmLsRequest {
    pub fn to_cmd(&self, result_dst: &Path) -> Result<SayaCmd> {
        let mut cmd = SayaCmd::subcommand(&self.ctx.exe, &["vm", "ls"])?;
        let id = self.id.trim();
        if !id.is_empty() {
            cmd.with_ref(id);
        }
        cmd.with_request_ctx(&self.ctx);

        cmd.flag_if_not_blank("--format", "json");
        cmd.flag_if_not_blank("--result-dst", &result_dst.to_string_lossy());

        let mut filters = Vec::with_capacity(3);
        for (key, val) in [
            ("name", self.name.trim()),
            ("compute-type", self.compute_type.trim()),
            ("os-variant", self.os_variant.trim()),
        ] {
            if !val.is_empty() {
                filters.push(format!("{key}={val}"));
            }
        }
        cmd.multi_flag_if_not_empty("--filter", &filters);
        Ok(cmd)
    }
}

pub async fn ls(cancel: &CancellationToken, req: VmLsRequest) -> Result<Vec<VmLsResult>> {
    tracing::debug!(request = ?req, "vm ls requested");
    let base_img_filter = match req.img_ref.trim() {
        "" => None,
        img_ref => Some(format!("{}:", Reference::parse(img_ref)?.normalized())),
    };

    let result_dst = ResultDst::new()?;
    let cmd = req.to_cmd(result_dst.path())?;
    cmd.ensure_valid()?;
    let outcome = cmd.exec(cancel).await?;
    tracing::debug!(?outcome, "vm ls execution outcome");

    let res_list: Vec<VmLsCmdRes> = decode_json_file("vm ls", result_dst.path()).await?;
    let state_filter = req.state.trim();
    let results = res_list
        .into_iter()
        .map(VmLsResult::from)
        .filter(|vm| state_filter.is_empty() || vm.state == state_filter)
        .filter(|vm| {
            base_img_filter
                .as_deref()
                .is_none_or(|prefix| vm.base_img.starts_with(prefix))
        })
        .collect();
    Ok(results)
}
