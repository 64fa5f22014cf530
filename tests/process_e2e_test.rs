//! End-to-end runs against stand-in tool binaries.

#![cfg(unix)]

mod common;

use common::{call, stub_binary};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use secops_mcp::domain::models::Config;
use secops_mcp::services::{registry_from_config, OperationRegistry};

fn registry(binaries: HashMap<String, String>, configure: impl FnOnce(&mut Config)) -> OperationRegistry {
    let mut config = Config {
        binaries,
        ..Config::default()
    };
    configure(&mut config);
    registry_from_config(&config).unwrap()
}

fn override_for(name: &str, path: &std::path::Path) -> HashMap<String, String> {
    HashMap::from([(name.to_string(), path.display().to_string())])
}

#[tokio::test]
async fn test_subdomain_enum_through_real_process() {
    let dir = tempfile::tempdir().unwrap();
    let subfinder = stub_binary(
        dir.path(),
        "subfinder",
        r#"printf '%s\n' '{"host":"a.example.com","source":"crtsh"}' '{"host":"b.example.com","source":"dnsdumpster"}' ''"#,
    );
    let registry = registry(override_for("subfinder", &subfinder), |_| {});

    let envelope = call(&registry, "subdomain_enum", json!({ "domain": "example.com" })).await;
    assert_eq!(
        envelope,
        json!({
            "success": true,
            "domain": "example.com",
            "recursive": false,
            "subdomains": [
                { "host": "a.example.com", "source": "crtsh" },
                { "host": "b.example.com", "source": "dnsdumpster" }
            ],
            "count": 2
        })
    );
}

#[tokio::test]
async fn test_arguments_reach_the_process_unmodified() {
    let dir = tempfile::tempdir().unwrap();
    // echo each argument back as a JSON line
    let httpx = stub_binary(
        dir.path(),
        "httpx",
        r#"for arg in "$@"; do printf '{"arg":"%s"}\n' "$arg"; done"#,
    );
    let registry = registry(override_for("httpx", &httpx), |_| {});

    let envelope = call(&registry, "http_probe", json!({ "urls": ["https://a.test/?q=1;id"] })).await;
    let args: Vec<_> = envelope["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["arg"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        args,
        vec!["-json", "-silent", "-timeout", "10", "-u", "https://a.test/?q=1;id"]
    );
}

#[tokio::test]
async fn test_many_targets_are_fed_on_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let httpx = stub_binary(
        dir.path(),
        "httpx",
        r#"while read -r url; do printf '{"url":"%s"}\n' "$url"; done"#,
    );
    let registry = registry(override_for("httpx", &httpx), |_| {});

    let envelope = call(
        &registry,
        "http_probe",
        json!({ "urls": ["https://a.test", "https://b.test"] }),
    )
    .await;
    assert_eq!(envelope["count"], 2);
    assert_eq!(envelope["results"][1]["url"], "https://b.test");
}

#[tokio::test]
async fn test_missing_binary_is_tool_not_found() {
    let registry = registry(
        HashMap::from([(
            "tlsx".to_string(),
            "/nonexistent/secops-mcp/tlsx".to_string(),
        )]),
        |_| {},
    );

    let envelope = call(&registry, "tls_inspect", json!({ "host": "example.com" })).await;
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error_kind"], "tool_not_found");
}

#[tokio::test]
async fn test_timeout_terminates_the_process() {
    let dir = tempfile::tempdir().unwrap();
    let xsstrike = stub_binary(dir.path(), "xsstrike", "exec sleep 30");
    let registry = registry(override_for("xsstrike", &xsstrike), |config| {
        config.execution.default_timeout_secs = 1;
        config.execution.terminate_grace_ms = 100;
    });

    let started = std::time::Instant::now();
    let envelope = call(&registry, "xss_scan", json!({ "url": "https://t.test/" })).await;
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert_eq!(envelope["error_kind"], "timeout");
    assert_eq!(envelope["timeout_seconds"], 1);
    assert_eq!(envelope["url"], "https://t.test/");
}

#[tokio::test]
async fn test_custom_wordlist_is_removed_after_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    // report the wordlist passed with -w, then its contents
    let arjun = stub_binary(
        dir.path(),
        "arjun",
        r#"while [ "$#" -gt 0 ]; do
  if [ "$1" = "-w" ]; then list="$2"; fi
  shift
done
echo "[+] Parameters found: $(tr '\n' ',' < "$list" | sed 's/,$//; s/,/, /g')"
echo "$list" >&2"#,
    );
    let registry = registry(override_for("arjun", &arjun), |config| {
        config.execution.scratch_dir = scratch.path().to_path_buf();
    });

    let envelope = call(
        &registry,
        "param_discover_custom",
        json!({ "url": "http://t.test/", "custom_params": ["debug", "admin"] }),
    )
    .await;
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["parameters"], json!(["debug", "admin"]));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_registry_is_shareable_across_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let tlsx = stub_binary(dir.path(), "tlsx", r#"printf '{"host":"%s"}\n' "$2""#);
    let registry = Arc::new(registry(override_for("tlsx", &tlsx), |_| {}));

    let handles: Vec<_> = ["a.test", "b.test", "c.test"]
        .into_iter()
        .map(|host| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let (success, text) = registry.dispatch_text("tls_inspect", json!({ "host": host })).await;
                (host, success, text)
            })
        })
        .collect();

    for handle in handles {
        let (host, success, text) = handle.await.unwrap();
        assert!(success);
        assert!(text.contains(host));
    }
}
