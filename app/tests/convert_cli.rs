use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

const TEMPLATE: &str = "\
mixed-port: 7890
proxy-groups:
  - name: Proxy
    type: select
    proxies:
      - <all>
      - DIRECT
rules:
  - MATCH,Proxy
";

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("tpl.yaml"), TEMPLATE).expect("write template");
    fs::write(
        dir.path().join("sub.txt"),
        "trojan://pw@hk.example.com:443#Hong%20Kong%2001\ntrojan://pw@x.example.com:443#Node\n",
    )
    .expect("write sub");
    dir
}

fn subconv() -> Command {
    let mut cmd = Command::cargo_bin("subconv").unwrap();
    cmd.env_remove("SC_TEMPLATE").env_remove("RUST_LOG");
    cmd
}

#[test]
fn convert_to_stdout() {
    let dir = workspace();
    subconv()
        .current_dir(dir.path())
        .args(["convert", "-t", "tpl.yaml", "-s", "sub.txt#Air"])
        .assert()
        .success()
        .stdout(contains("🇭🇰 Air Hong Kong 01"))
        .stdout(contains("name: 🇭🇰 HK"))
        .stdout(contains("mixed-port: 7890"));
}

#[test]
fn convert_writes_output_file() {
    let dir = workspace();
    let out = dir.path().join("out/clash.yaml");
    subconv()
        .args([
            "convert",
            "--base-dir",
            dir.path().to_str().unwrap(),
            "-t",
            "tpl.yaml",
            "-s",
            "sub.txt",
            "--prepend-rule",
            "DOMAIN,ads.example,REJECT",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    let written = fs::read_to_string(&out).expect("output written");
    assert!(written.contains("- DOMAIN,ads.example,REJECT\n- MATCH,Proxy"));
}

#[test]
fn options_file_and_json_output() {
    let dir = workspace();
    fs::write(
        dir.path().join("opts.json"),
        r#"{"template": "tpl.yaml", "subs": ["sub.txt"], "remove": "Node", "ignoreCountryGroup": true}"#,
    )
    .unwrap();
    subconv()
        .current_dir(dir.path())
        .args(["convert", "--options", "opts.json", "--format", "json"])
        .assert()
        .success()
        .stdout(contains("\"proxy-groups\""))
        .stdout(contains("Node").not())
        .stdout(contains("🇭🇰 HK\"").not());
}

#[test]
fn template_from_env() {
    let dir = workspace();
    subconv()
        .current_dir(dir.path())
        .env("SC_TEMPLATE", "tpl.yaml")
        .args(["convert", "-s", "sub.txt"])
        .assert()
        .success()
        .stdout(contains("- DIRECT"));
}

#[test]
fn builtin_template_when_none_given() {
    let dir = workspace();
    subconv()
        .current_dir(dir.path())
        .args(["convert", "-s", "sub.txt", "--dialect", "clash"])
        .assert()
        .success()
        .stdout(contains("节点选择"));
}

#[test]
fn invalid_remove_pattern_fails() {
    let dir = workspace();
    subconv()
        .current_dir(dir.path())
        .args(["convert", "-t", "tpl.yaml", "-s", "sub.txt", "--remove", "("])
        .assert()
        .failure()
        .stderr(contains("invalid remove"));
}

#[test]
fn missing_sources_fail() {
    subconv()
        .args(["convert", "-t", "tpl.yaml"])
        .assert()
        .failure()
        .stderr(contains("at least one subscription"));
}

#[test]
fn parse_from_stdin() {
    subconv()
        .args(["parse", "--tag", "S", "--normalize"])
        .write_stdin("trojan://pw@h:443#Japan\ntrojan://pw@h:443#Japan\n")
        .assert()
        .success()
        .stdout(contains("🇯🇵 S Japan 1"));
}
