//! Integration tests for the CLI helpers

use eyre::Result;
use qdi_ps_client::capabilities::CapabilityView;
use qdi_ps_client::cli::{download_artifacts, load_gateway, run_extraction, show_capabilities};
use serde_json::json;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Write a sample task export and mapping file
fn create_inputs(dir: &std::path::Path) -> Result<(Vec<PathBuf>, PathBuf)> {
    let task = dir.join("Replication_Task.json");
    std::fs::write(
        &task,
        serde_json::to_string_pretty(&json!({
            "cmd.replication_definition": {
                "tasks": [{"task": {"name": "Replication_Task"}}]
            }
        }))?,
    )?;
    let mapping = dir.join("mapping.tsv");
    std::fs::write(&mapping, "server\tenvironment\nqlik-01\tPROD\n")?;
    Ok((vec![task], mapping))
}

#[tokio::test]
async fn test_run_extraction_downloads_outputs() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract/run"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"outputs": ["task_settings.csv"]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/task_settings.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("task,setting\nA,1\n"))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let (json_files, mapping) = create_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let gateway = load_gateway(Some(&server.uri()))?;
    let references = run_extraction(
        &gateway,
        &json_files,
        Some(mapping.as_path()),
        Some(out_dir.as_path()),
    )
    .await?;

    assert_eq!(references.len(), 1);
    assert_eq!(references[0].identifier, "task_settings.csv");
    assert_eq!(
        std::fs::read_to_string(out_dir.join("task_settings.csv"))?,
        "task,setting\nA,1\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_run_extraction_reports_failure() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract/run"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let (json_files, mapping) = create_inputs(temp_dir.path())?;
    let gateway = load_gateway(Some(&server.uri()))?;

    let err = run_extraction(&gateway, &json_files, Some(mapping.as_path()), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Extraction failed"));

    Ok(())
}

#[tokio::test]
async fn test_run_extraction_missing_input_file() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract/run"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"outputs": []})))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let gateway = load_gateway(Some(&server.uri()))?;
    let missing = vec![temp_dir.path().join("missing.json")];

    let err = run_extraction(&gateway, &missing, None, None).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read file"));

    Ok(())
}

#[tokio::test]
async fn test_download_artifacts_http_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/gone.csv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let gateway = load_gateway(Some(&server.uri()))?;

    let err = download_artifacts(&gateway, ["gone.csv"], temp_dir.path())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("gone.csv"));
    assert!(!temp_dir.path().join("gone.csv").exists());

    Ok(())
}

#[tokio::test]
async fn test_download_artifacts_reported_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/gone.csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": "File not found: backend/temp_uploads/gone.csv"})),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let gateway = load_gateway(Some(&server.uri()))?;

    let err = download_artifacts(&gateway, ["gone.csv"], temp_dir.path())
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("File not found"));
    assert!(!temp_dir.path().join("gone.csv").exists());

    Ok(())
}

#[tokio::test]
async fn test_download_artifacts_keeps_plain_bodies() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/summary.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"error": "not a report"}"#, "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let gateway = load_gateway(Some(&server.uri()))?;

    let written = download_artifacts(&gateway, ["summary.json"], temp_dir.path()).await?;
    assert_eq!(
        std::fs::read_to_string(&written[0])?,
        r#"{"error": "not a report"}"#
    );

    Ok(())
}

#[tokio::test]
async fn test_show_capabilities() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/info/supported"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sources": ["Oracle"],
            "targets": []
        })))
        .mount(&server)
        .await;

    let gateway = load_gateway(Some(&server.uri()))?;
    let view = show_capabilities(&gateway).await;
    assert_eq!(
        view,
        CapabilityView::Lists {
            sources: vec!["Oracle".to_string()],
            targets: vec![],
        }
    );

    Ok(())
}

#[test]
#[serial]
fn test_load_gateway_from_env() -> Result<()> {
    // SAFETY: serialized with other environment-touching tests
    unsafe { std::env::set_var("QDI_API_BASE_URL", "http://192.168.56.1:8000") };
    let gateway = load_gateway(None)?;
    assert_eq!(gateway.origin().as_str(), "http://192.168.56.1:8000/");

    unsafe { std::env::remove_var("QDI_API_BASE_URL") };
    let err = load_gateway(None).unwrap_err();
    assert!(err.to_string().contains("QDI_API_BASE_URL"));

    Ok(())
}

#[test]
#[serial]
fn test_explicit_url_wins_over_env() -> Result<()> {
    unsafe { std::env::set_var("QDI_API_BASE_URL", "not a url") };
    let gateway = load_gateway(Some("http://localhost:8000"))?;
    assert_eq!(gateway.origin().as_str(), "http://localhost:8000/");
    unsafe { std::env::remove_var("QDI_API_BASE_URL") };

    Ok(())
}
