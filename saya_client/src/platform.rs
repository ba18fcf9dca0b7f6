//! Platform strings (`os/arch[/variant]`) and their normalization.
//!
//! Normalization maps the common architecture aliases onto their canonical
//! names (`x86_64` → `amd64`, `aarch64` → `arm64`, `armhf` → `arm/v7`, …)
//! so that the filters sent to the external program and the values read
//! back from its result files compare equal.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SayaError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arch: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arch_variant: String,
}

impl Platform {
    /// Parses and normalizes an `os/arch[/variant]` string.
    pub fn parse(platform_str: &str) -> Result<Self> {
        let trimmed = platform_str.trim();
        let parts: Vec<&str> = trimmed.split('/').map(str::trim).collect();
        let (os, arch, variant) = match parts.as_slice() {
            [os, arch] => (*os, *arch, ""),
            [os, arch, variant] => (*os, *arch, *variant),
            _ => return Err(SayaError::BadPlatform(platform_str.to_string())),
        };
        if os.is_empty() || arch.is_empty() {
            return Err(SayaError::BadPlatform(platform_str.to_string()));
        }

        let os = normalize_os(os);
        let (arch, arch_variant) = normalize_arch(arch, variant);
        Ok(Self {
            os,
            arch,
            arch_variant,
        })
    }

    /// `arch[/variant]`, e.g. `arm64` or `arm/v7`.
    pub fn arch_with_variant(&self) -> String {
        if self.arch_variant.is_empty() {
            return self.arch.clone();
        }
        format!("{}/{}", self.arch, self.arch_variant)
    }

    /// `os/arch[/variant]`, e.g. `linux/amd64` or `linux/arm/v7`.
    pub fn platform_str(&self) -> String {
        if self.arch_variant.is_empty() {
            return format!("{}/{}", self.os, self.arch);
        }
        format!("{}/{}/{}", self.os, self.arch, self.arch_variant)
    }
}

/// A platform which also knows the os variant (e.g. `ubuntu`, `alpine`).
/// Software oriented, since the os variant hints at what natively belongs
/// (apt for ubuntu, rpm for redhat).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSw {
    #[serde(flatten)]
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_variant: String,
}

fn normalize_os(os: &str) -> String {
    let os = os.to_lowercase();
    match os.as_str() {
        "macos" => "darwin".to_string(),
        _ => os,
    }
}

fn normalize_arch(arch: &str, variant: &str) -> (String, String) {
    let arch = arch.to_lowercase();
    let variant = variant.to_lowercase();
    match arch.as_str() {
        "i386" | "i686" | "x86" | "386" => ("386".to_string(), variant),
        "x86_64" | "x86-64" | "amd64" => {
            let variant = if variant == "v1" { String::new() } else { variant };
            ("amd64".to_string(), variant)
        }
        "aarch64" | "arm64" => {
            let variant = match variant.as_str() {
                "8" | "v8" => String::new(),
                _ => variant,
            };
            ("arm64".to_string(), variant)
        }
        "armhf" => ("arm".to_string(), "v7".to_string()),
        "armel" => ("arm".to_string(), "v6".to_string()),
        "arm" => {
            let variant = match variant.as_str() {
                "" => String::new(),
                v if !v.starts_with('v') => format!("v{v}"),
                v => v.to_string(),
            };
            ("arm".to_string(), variant)
        }
        _ => (arch, variant),
    }
}
