//! Image metadata records as written by the external program.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::PlatformSw;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageTagMetaData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sha256: String,
    /// The image type e.g. ova, vhd, vmdk, iso, img, ...
    #[serde(default, rename = "type")]
    pub img_type: String,
    #[serde(default)]
    pub platform: PlatformSw,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// build | convert | tag | http | s3
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub src_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_full_record() {
        let json = r#"{
            "name": "ubuntu",
            "version": "v1",
            "sha256": "472c9bc5d01d2f98b102d5d6d3477d61",
            "type": "ova",
            "platform": {"os": "linux", "arch": "arm64", "os_variant": "ubuntu"},
            "created_at": "2023-07-03T08:45:36.599939836+02:00",
            "labels": {"audience": "tester"},
            "src_type": "http"
        }"#;
        let meta: ImageTagMetaData = serde_json::from_str(json).unwrap();
        assert_eq!(meta.name, "ubuntu");
        assert_eq!(meta.img_type, "ova");
        assert_eq!(meta.platform.platform.os, "linux");
        assert_eq!(meta.platform.os_variant, "ubuntu");
        assert!(meta.created_at.is_some());
        assert_eq!(meta.labels["audience"], "tester");
    }

    #[test]
    fn test_decodes_sparse_record_with_defaults() {
        let meta: ImageTagMetaData = serde_json::from_str(r#"{"name":"ubuntu"}"#).unwrap();
        assert_eq!(meta.name, "ubuntu");
        assert_eq!(meta.version, "");
        assert_eq!(meta.created_at, None);
        assert!(meta.labels.is_empty());
    }
}
