//! `saya image pull`: fetch an image from a remote repository into the
//! forge.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::command::{RequestCtx, SayaCmd};
use crate::error::Result;
use crate::ops::img_meta::ImageTagMetaData;
use crate::platform::PlatformSw;
use crate::reference::Reference;
use crate::repo::{HttpRepo, S3Repo};
use crate::result_file::{ResultDst, decode_json_file};

#[derive(Debug, Clone, Default)]
pub struct PullRequest {
    pub ctx: RequestCtx,
    /// Image reference `name[:version]`; required.
    pub name: String,
    pub img_type: String,
    pub platform: String,
    pub hash: String,
    /// http | s3; selects which configured repo the program pulls from.
    pub repo_type: String,
    pub http_repo: Option<HttpRepo>,
    pub s3_repo: Option<S3Repo>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullResult {
    pub name: String,
    pub version: String,
    pub sha256: String,
    pub img_type: String,
    pub platform: PlatformSw,
    /// Type of the repo used to fetch the image, e.g. http, s3.
    pub src_type: String,
}

impl From<ImageTagMetaData> for PullResult {
    fn from(meta: ImageTagMetaData) -> Self {
        Self {
            name: meta.name,
            version: meta.version,
            sha256: meta.sha256,
            img_type: meta.img_type,
            platform: meta.platform,
            src_type: meta.src_type,
        }
    }
}

impl PullRequest {
    pub fn to_cmd(&self, result_dst: &Path) -> Result<SayaCmd> {
        let reference = Reference::parse(&self.name)?;
        let mut cmd = SayaCmd::subcommand(&self.ctx.exe, &["image", "pull"])?;
        cmd.with_ref(&reference.normalized());
        cmd.with_request_ctx(&self.ctx);

        cmd.flag_if_not_blank("--hash", &self.hash);
        cmd.flag_if_not_blank("--img-type", &self.img_type);
        cmd.flag_if_not_blank("--platform", &self.platform);
        cmd.flag_if_not_blank("--repo-type", &self.repo_type);

        if let Some(repo) = &self.http_repo {
            repo.append_flags(&mut cmd);
        }
        if let Some(repo) = &self.s3_repo {
            repo.append_flags(&mut cmd);
        }

        cmd.flag_if_not_blank("--result-dst", &result_dst.to_string_lossy());
        Ok(cmd)
    }
}

pub async fn pull(cancel: &CancellationToken, req: PullRequest) -> Result<PullResult> {
    tracing::debug!(request = ?req, "image pull requested");
    let result_dst = ResultDst::new()?;
    let cmd = req.to_cmd(result_dst.path())?;
    cmd.ensure_valid()?;
    let outcome = cmd.exec(cancel).await?;
    tracing::debug!(?outcome, "image pull execution outcome");

    let meta: ImageTagMetaData = decode_json_file("image pull", result_dst.path()).await?;
    Ok(PullResult::from(meta))
}
