use std::fs::write;
use std::sync::{Arc, Mutex};

use gcs_indexer::batch::{
    delete_ids, delete_session, index_documents, index_file, index_session, parse_line,
    BatchReport,
};
use gcs_indexer::cli::writer_params;
use gcs_indexer_core::contract::{IndexWriterParams, MockIndexWriter};
use gcs_indexer_core::document::Document;
use gcs_indexer_core::error::{IndexWriterError, ServiceError};
use mockall::Sequence;
use tempfile::NamedTempFile;

fn input_file(lines: &[&str]) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), lines.join("\n")).expect("write input");
    file
}

/// A writer that rejects documents without a content type, like the real one does.
fn validating_writer(seen: Arc<Mutex<Vec<String>>>) -> MockIndexWriter {
    let mut writer = MockIndexWriter::new();
    writer.expect_write().returning(move |doc| {
        seen.lock()
            .unwrap()
            .push(doc.id().unwrap_or_default().to_string());
        match doc.content_type() {
            Some(_) => Ok(()),
            None => Err(IndexWriterError::ContentTypeMissing),
        }
    });
    writer
}

#[test]
fn parse_line_skips_blank_lines() {
    assert_eq!(parse_line("   ").unwrap(), None);
    let doc = parse_line(r#"{"id": "a", "type": "text/plain"}"#)
        .unwrap()
        .unwrap();
    assert_eq!(doc.id(), Some("a"));
    assert!(parse_line("{not json").is_err());
}

#[tokio::test]
async fn index_documents_continues_after_rejection() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut writer = validating_writer(seen.clone());
    let docs = vec![
        Document::new().with("id", "1").with("type", "text/plain"),
        Document::new().with("id", "2"),
        Document::new().with("id", "3").with("type", "text/plain"),
    ];

    let report = index_documents(&mut writer, &docs).await;

    assert_eq!(report.submitted, 2);
    assert_eq!(report.rejected, 1);
    assert_eq!(*seen.lock().unwrap(), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn index_file_counts_malformed_lines() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut writer = validating_writer(seen.clone());
    let input = input_file(&[
        r#"{"id": "1", "type": "text/plain", "content": "hello"}"#,
        "",
        "this is not json",
        r#"{"id": "2", "content": "no type"}"#,
        r#"{"id": "3", "type": "text/html", "content": "<p>hi</p>"}"#,
    ]);

    let report = index_file(&mut writer, input.path()).await.unwrap();

    assert_eq!(
        report,
        BatchReport {
            submitted: 2,
            rejected: 2,
            deleted: 0,
            failed_deletes: 0
        }
    );
    assert_eq!(*seen.lock().unwrap(), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn index_file_fails_for_missing_input() {
    let mut writer = MockIndexWriter::new();
    writer.expect_write().never();
    let err = index_file(&mut writer, std::path::Path::new("/no/such/input.jsonl"))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("failed to open input file"));
}

#[tokio::test]
async fn delete_ids_continues_after_failure() {
    let mut writer = MockIndexWriter::new();
    writer.expect_delete().times(3).returning(|id| {
        if id == "bad" {
            Err(IndexWriterError::Delete {
                id: id.to_string(),
                source: ServiceError::Api {
                    status: 404,
                    body: "not found".to_string(),
                },
            })
        } else {
            Ok(())
        }
    });
    let ids = vec!["a".to_string(), "bad".to_string(), "c".to_string()];

    let report = delete_ids(&mut writer, &ids).await;

    assert_eq!(report.deleted, 2);
    assert_eq!(report.failed_deletes, 1);
}

#[tokio::test]
async fn index_session_opens_writes_commits_and_closes_in_order() {
    let mut seq = Sequence::new();
    let mut writer = MockIndexWriter::new();
    let params = writer_params(std::path::Path::new("/etc/gcs.yaml"), Some("TEXT"));
    let expected = params.clone();
    writer
        .expect_open()
        .withf(move |p| *p == expected)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    writer.expect_describe().return_const("mock".to_string());
    writer
        .expect_write()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    writer
        .expect_commit()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    writer
        .expect_close()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    let input = input_file(&[r#"{"id": "1", "type": "text/plain", "content": "x"}"#]);

    let report = index_session(&mut writer, &params, input.path())
        .await
        .unwrap();
    assert_eq!(report.submitted, 1);
}

#[tokio::test]
async fn index_session_closes_writer_when_input_is_missing() {
    let mut writer = MockIndexWriter::new();
    writer.expect_open().returning(|_| Ok(()));
    writer.expect_describe().return_const("mock".to_string());
    writer.expect_commit().never();
    writer.expect_close().times(1).return_const(());

    let result = index_session(
        &mut writer,
        &IndexWriterParams::new(),
        std::path::Path::new("/no/such/input.jsonl"),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn session_fails_when_writer_does_not_open() {
    let mut writer = MockIndexWriter::new();
    writer
        .expect_open()
        .returning(|_| Err(IndexWriterError::MissingConfigPath));
    writer.expect_close().never();

    let err = delete_session(&mut writer, &IndexWriterParams::new(), &["a".to_string()])
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Missing required configuration parameter"));
}

#[test]
fn writer_params_carry_config_path_and_format() {
    let params = writer_params(std::path::Path::new("/etc/gcs.yaml"), Some("text"));
    assert_eq!(params.get("gcs.config.file"), Some("/etc/gcs.yaml"));
    assert_eq!(params.get("gcs.uploadFormat"), Some("text"));

    let params = writer_params(std::path::Path::new("/etc/gcs.yaml"), None);
    assert_eq!(params.get("gcs.uploadFormat"), None);
}
