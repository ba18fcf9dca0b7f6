//! `saya image ls`: list images in the forge (local image store).

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::command::{RequestCtx, SayaCmd};
use crate::error::Result;
use crate::ops::img_meta::ImageTagMetaData;
use crate::platform::{Platform, PlatformSw};
use crate::reference::Reference;
use crate::result_file::{ResultDst, decode_json_file};

#[derive(Debug, Clone, Default)]
pub struct LsRequest {
    pub ctx: RequestCtx,
    /// Image reference to narrow by, `name[:version]`; blank lists all.
    pub name: String,
    /// Explicit version; wins over a tag embedded in `name`.
    pub version: String,
    pub img_type: String,
    /// `os/arch[/variant]`; becomes `os=` and `arch=` filters.
    pub platform: String,
    pub os_variant: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LsResult {
    pub name: String,
    pub version: String,
    pub sha256: String,
    pub img_type: String,
    pub platform: PlatformSw,
    pub src_type: String,
}

impl LsResult {
    /// `platform:name:version:type`, e.g. `linux/arm64:ubuntu:v1:ova`.
    pub fn platform_name_version_type_taglike(&self) -> String {
        [
            self.platform.platform.platform_str(),
            self.name.clone(),
            self.version.clone(),
            self.img_type.clone(),
        ]
        .join(":")
    }
}

impl From<ImageTagMetaData> for LsResult {
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

impl LsRequest {
    /// Builds the `image ls` invocation writing its result to `result_dst`.
    ///
    /// Filter append order is img-type, then os, then arch; the reference
    /// narrowing (name/version/sha256/os-variant) is applied to the decoded
    /// list, not to the argument vector.
    pub fn to_cmd(&self, result_dst: &Path) -> Result<SayaCmd> {
        let mut cmd = SayaCmd::subcommand(&self.ctx.exe, &["image", "ls"])?;
        cmd.with_request_ctx(&self.ctx);

        let mut filters = Vec::with_capacity(3);
        let img_type = self.img_type.trim();
        if !img_type.is_empty() {
            filters.push(format!("img-type={img_type}"));
        }
        let platform_str = self.platform.trim();
        if !platform_str.is_empty() {
            let platform = Platform::parse(platform_str)?;
            filters.push(format!("os={}", platform.os));
            filters.push(format!("arch={}", platform.arch_with_variant()));
        }
        cmd.multi_flag_if_not_empty("--filter", &filters);

        cmd.flag_if_not_blank("--format", "json");
        cmd.flag_if_not_blank("--result-dst", &result_dst.to_string_lossy());
        Ok(cmd)
    }

    fn name_version_filter(&self) -> Result<(Option<String>, Option<String>)> {
        let name = self.name.trim();
        let version = self.version.trim();
        let explicit_version = (!version.is_empty()).then(|| version.to_string());
        if name.is_empty() {
            return Ok((None, explicit_version));
        }
        let reference = Reference::parse(name)?;
        let version_filter =
            explicit_version.or_else(|| name.contains(':').then(|| reference.version.clone()));
        Ok((Some(reference.name), version_filter))
    }
}

pub async fn ls(cancel: &CancellationToken, req: LsRequest) -> Result<Vec<LsResult>> {
    tracing::debug!(request = ?req, "image ls requested");
    let (name_filter, version_filter) = req.name_version_filter()?;

    let result_dst = ResultDst::new()?;
    let cmd = req.to_cmd(result_dst.path())?;
    cmd.ensure_valid()?;
    let outcome = cmd.exec(cancel).await?;
    tracing::debug!(?outcome, "image ls execution outcome");

    let metas: Vec<ImageTagMetaData> = decode_json_file("image ls", result_dst.path()).await?;
    let results = metas
        .into_iter()
        .filter(|meta| name_filter.as_deref().is_none_or(|name| meta.name == name))
        .filter(|meta| {
            version_filter
                .as_deref()
                .is_none_or(|version| meta.version == version)
        })
        .filter(|meta| {
            let sha256 = req.sha256.trim();
            sha256.is_empty() || meta.sha256 == sha256
        })
        .filter(|meta| {
            let os_variant = req.os_variant.trim();
            os_variant.is_empty() || meta.platform.os_variant == os_variant
        })
        .map(LsResult::from)
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_version_filter_splits_embedded_tag() {
        let req = LsRequest {
            name: "ubuntu:v2".to_string(),
            ..LsRequest::default()
        };
        let (name, version) = req.name_version_filter().unwrap();
        assert_eq!(name.as_deref(), Some("ubuntu"));
        assert_eq!(version.as_deref(), Some("v2"));
    }

    #[test]
    fn test_explicit_version_wins_over_embedded_tag() {
        let req = LsRequest {
            name: "ubuntu:v2".to_string(),
            version: "v3".to_string(),
            ..LsRequest::default()
        };
        let (_, version) = req.name_version_filter().unwrap();
        assert_eq!(version.as_deref(), Some("v3"));
    }

    #[test]
    fn test_bare_name_does_not_pin_a_version() {
        let req = LsRequest {
            name: "ubuntu".to_string(),
            ..LsRequest::default()
        };
        let (name, version) = req.name_version_filter().unwrap();
        assert_eq!(name.as_deref(), Some("ubuntu"));
        assert_eq!(version, None);
    }

    #[test]
    fn test_to_cmd_without_platform_or_type_has_no_filters() {
        let req = LsRequest {
            ctx: RequestCtx {
                exe: "saya".to_string(),
                ..RequestCtx::default()
            },
            ..LsRequest::default()
        };
        let cmd = req.to_cmd(Path::new("/tmp/r.json")).unwrap();
        assert_eq!(
            cmd.args.exec_args(),
            vec![
                "image",
                "ls",
                "--format",
                "json",
                "--result-dst",
                "/tmp/r.json"
            ]
        );
    }
}
