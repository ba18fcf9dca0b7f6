//! Image references and image ids.
//!
//! A reference is `name[:version]`; a missing version normalizes to
//! `latest`. An image id additionally pins the platform and the image type:
//! `platform:name:version:type`, e.g. `linux/arm64:ubuntu:v1:ova`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SayaError};
use crate::platform::Platform;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    /// The reference value as given, e.g. `ubuntu:latest`.
    pub original: String,
    pub name: String,
    /// Normalized, i.e. `latest` if none was given.
    pub version: String,
}

impl Reference {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(SayaError::Input(
                "image reference must not be blank".to_string(),
            ));
        }
        let parts: Vec<&str> = reference.split(':').collect();
        match parts.as_slice() {
            [name] => Ok(Self {
                original: reference.to_string(),
                name: name.trim().to_string(),
                version: "latest".to_string(),
            }),
            [name, version] => Ok(Self {
                original: reference.to_string(),
                name: name.trim().to_string(),
                version: version.trim().to_string(),
            }),
            _ => Err(SayaError::BadReference(reference.to_string())),
        }
    }

    pub fn from_name_and_version(name: &str, version: &str) -> Self {
        Self {
            original: format!("{name}:{version}"),
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    pub fn normalized(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }
}

impl FromStr for Reference {
    type Err = SayaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

/// Builds the id identifying a tagged image in a repository:
/// `<platform>:<name>:<version>:<img-type>`. All parts must be non-blank.
pub fn img_id(name: &str, version: &str, platform: &str, img_type: &str) -> Result<String> {
    let parts = [platform, name, version, img_type];
    let normalized: Vec<&str> = parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
    if normalized.len() != parts.len() {
        return Err(SayaError::Input(format!(
            "img id needs all attributes non-blank: \
             name={name:?} version={version:?} platform={platform:?} img-type={img_type:?}"
        )));
    }
    Ok(normalized.join(":"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImgId {
    pub platform: Platform,
    pub reference: Reference,
    pub img_type: String,
}

impl ParsedImgId {
    pub fn parse(img_id: &str) -> Result<Self> {
        let parts: Vec<&str> = img_id
            .trim()
            .split(':')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let &[platform_str, name, version, img_type] = parts.as_slice() else {
            return Err(SayaError::BadImgId(img_id.to_string()));
        };
        Ok(Self {
            platform: Platform::parse(platform_str)?,
            reference: Reference::from_name_and_version(name, version),
            img_type: img_type.to_string(),
        })
    }
}
