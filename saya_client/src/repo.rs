//! Remote repository configuration (http and s3).
//!
//! These structs describe where images are pulled from or pushed to. Secret
//! fields (basic-auth password, aws secret key, session token) are
//! [`Opaque`] so they reach the real argument vector but never a log line.

use chrono::{DateTime, Utc};

use crate::command::SayaCmd;
use crate::opaque::Opaque;

pub const REPO_TYPE_HTTP: &str = "http";
pub const REPO_TYPE_S3: &str = "s3";

pub fn is_repo_type_http(repo_type: &str) -> bool {
    repo_type == "http" || repo_type == "https"
}

pub fn is_repo_type_s3(repo_type: &str) -> bool {
    repo_type == "s3"
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: Opaque,
    pub session_token: Opaque,
    /// Source of the credentials.
    pub source: String,
    /// Time the credentials will expire, if they can.
    pub expires: Option<DateTime<Utc>>,
}

impl AwsCredentials {
    pub fn normalized(&self) -> Self {
        let mut copy = self.clone();
        copy.access_key_id = copy.access_key_id.trim().to_string();
        copy.secret_access_key.normalize();
        copy.session_token.normalize();
        copy.source = copy.source.trim().to_string();
        copy
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHttpBasic {
    pub username: String,
    pub pwd: Opaque,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRepo {
    pub repo_url: String,
    pub base_path: String,
    pub upload_strategy: String,
    pub auth_http_basic: AuthHttpBasic,
}

impl HttpRepo {
    /// Trims all fields; an entirely empty config collapses to `None`.
    pub fn normalize_to_none(&self) -> Option<Self> {
        let mut copy = self.clone();
        copy.repo_url = copy.repo_url.trim().to_string();
        copy.base_path = copy.base_path.trim().to_string();
        copy.upload_strategy = copy.upload_strategy.trim().to_string();
        copy.auth_http_basic.username = copy.auth_http_basic.username.trim().to_string();
        copy.auth_http_basic.pwd.normalize();
        if copy == Self::default() {
            return None;
        }
        Some(copy)
    }

    /// Appends the `--http-*` flag family for this repo.
    pub fn append_flags(&self, cmd: &mut SayaCmd) {
        cmd.opaque_flag_if_not_blank("--http-auth-basic-password", &self.auth_http_basic.pwd);
        cmd.flag_if_not_blank("--http-auth-basic-username", &self.auth_http_basic.username);
        cmd.flag_if_not_blank("--http-base-path", &self.base_path);
        cmd.flag_if_not_blank("--http-repo-url", &self.repo_url);
        cmd.flag_if_not_blank("--http-upload-strategy", &self.upload_strategy);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Repo {
    pub bucket: String,
    pub base_key: String,
    pub ep_url: String,
    pub ep_url_s3: String,
    /// aws region to send requests to.
    pub region: String,
    pub auth_aws_creds: Option<AwsCredentials>,
    pub use_path_style: bool,
}

impl S3Repo {
    pub fn normalize_to_none(&self) -> Option<Self> {
        let mut copy = self.clone();
        copy.bucket = copy.bucket.trim().to_string();
        copy.base_key = copy.base_key.trim().to_string();
        copy.ep_url = copy.ep_url.trim().to_string();
        copy.ep_url_s3 = copy.ep_url_s3.trim().to_string();
        copy.region = copy.region.trim().to_string();
        copy.auth_aws_creds = copy
            .auth_aws_creds
            .as_ref()
            .map(AwsCredentials::normalized)
            .filter(|creds| *creds != AwsCredentials::default());
        if copy == Self::default() {
            return None;
        }
        Some(copy)
    }

    /// Appends the `--s3-*` flag family for this repo.
    pub fn append_flags(&self, cmd: &mut SayaCmd) {
        cmd.flag_if_not_blank("--s3-bucket", &self.bucket);
        cmd.flag_if_not_blank("--s3-base-key", &self.base_key);
        cmd.flag_if_not_blank("--s3-ep-url", &self.ep_url);
        cmd.flag_if_not_blank("--s3-ep-url-s3", &self.ep_url_s3);
        cmd.flag_if_not_blank("--s3-region", &self.region);
        if self.use_path_style {
            cmd.args.append_flag("--s3-use-path-style");
        }
        if let Some(creds) = &self.auth_aws_creds {
            cmd.flag_if_not_blank("--s3-access-key-id", &creds.access_key_id);
            cmd.opaque_flag_if_not_blank("--s3-secret-access-key", &creds.secret_access_key);
            cmd.opaque_flag_if_not_blank("--s3-session-token", &creds.session_token);
        }
    }
}

/// The optional remote repository configs of a request. At most one may be
/// acted on per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repos {
    pub http: Option<HttpRepo>,
    pub s3: Option<S3Repo>,
}

impl Repos {
    /// True if exactly one of the optional repo configs is present.
    pub fn exactly_one_repo_specified(&self) -> bool {
        self.http.is_some() as usize + self.s3.is_some() as usize == 1
    }

    /// True if only the s3 repo is specified.
    pub fn s3_only(&self) -> bool {
        self.exactly_one_repo_specified() && self.s3.is_some()
    }

    /// True if only the http repo is specified.
    pub fn http_only(&self) -> bool {
        self.exactly_one_repo_specified() && self.http.is_some()
    }

    pub fn available_repo_types(&self) -> Vec<&'static str> {
        let mut avails = Vec::with_capacity(2);
        if self.http.is_some() {
            avails.push(REPO_TYPE_HTTP);
        }
        if self.s3.is_some() {
            avails.push(REPO_TYPE_S3);
        }
        avails
    }
}
