//! Behavior tests for request-to-argument-vector assembly.

use std::path::Path;

use saya_client::args::CmdArg;
use saya_client::ops::img_ls::LsRequest;
use saya_client::{Opaque, RequestCtx, SayaCmd};

/// Test: the full `image ls` assembly for a typical data-source request.
/// Filter order follows the builder's append order: img-type, os, arch.
#[test]
fn test_image_ls_request_produces_expected_token_sequence() {
    let req = LsRequest {
        ctx: RequestCtx {
            exe: "saya".to_string(),
            ..RequestCtx::default()
        },
        name: "ubuntu".to_string(),
        version: "v1".to_string(),
        img_type: "ova".to_string(),
        platform: "linux/arm64".to_string(),
        ..LsRequest::default()
    };

    let result_dst = Path::new("/tmp/saya-client-test/result.json");
    let cmd = req.to_cmd(result_dst).unwrap();
    assert!(cmd.validation_errors().is_empty());
    assert_eq!(
        cmd.args.exec_args(),
        vec![
            "image",
            "ls",
            "--filter",
            "img-type=ova",
            "--filter",
            "os=linux",
            "--filter",
            "arch=arm64",
            "--format",
            "json",
            "--result-dst",
            "/tmp/saya-client-test/result.json",
        ]
    );
    // Nothing secret in this request: both renderings agree.
    assert_eq!(cmd.args.exec_args(), cmd.args.display_args());
}

/// Test: context flags come right after the subcommand tokens and the
/// license key only ever shows up masked.
#[test]
fn test_request_ctx_flags_precede_operation_flags() {
    let req = LsRequest {
        ctx: RequestCtx {
            exe: "saya".to_string(),
            config: "/etc/saya.yml".to_string(),
            forge: "/srv/forge".to_string(),
            license_key: Opaque::new("lk-123"),
            log_level: "debug".to_string(),
        },
        img_type: "qcow2".to_string(),
        ..LsRequest::default()
    };

    let cmd = req.to_cmd(Path::new("/tmp/r.json")).unwrap();
    assert_eq!(
        cmd.args.display_args(),
        vec![
            "image",
            "ls",
            "--config",
            "/etc/saya.yml",
            "--forge",
            "/srv/forge",
            "--license-key",
            "********",
            "--log-level",
            "debug",
            "--filter",
            "img-type=qcow2",
            "--format",
            "json",
            "--result-dst",
            "/tmp/r.json",
        ]
    );
    assert!(cmd.args.exec_args().contains(&"lk-123".to_string()));
    assert!(!cmd.args.display_args().contains(&"lk-123".to_string()));
}

/// Test: an override re-points a flag that an operation already set,
/// keeping its original position; a deleted override removes it entirely.
#[test]
fn test_overrides_rewrite_and_suppress_operation_flags() {
    let mut cmd = SayaCmd::subcommand("saya", &["image", "ls"]).unwrap();
    cmd.with_log_level("info");
    cmd.with_forge_location("/srv/forge");

    cmd.args
        .append_override(CmdArg::new("--log-level", "trace"));
    cmd.args.append_override(CmdArg::deleted("--forge"));

    assert_eq!(
        cmd.args.exec_args(),
        vec!["image", "ls", "--log-level", "trace"]
    );
}

/// Test: resolving the same unmodified command twice is byte-identical.
#[test]
fn test_resolution_is_idempotent_for_exec_and_display() {
    let req = LsRequest {
        ctx: RequestCtx {
            exe: "saya".to_string(),
            license_key: Opaque::new("lk-123"),
            ..RequestCtx::default()
        },
        platform: "linux/amd64".to_string(),
        ..LsRequest::default()
    };
    let cmd = req.to_cmd(Path::new("/tmp/r.json")).unwrap();
    assert_eq!(cmd.args.exec_args(), cmd.args.exec_args());
    assert_eq!(cmd.args.display_args(), cmd.args.display_args());
}
