use axum::Json;
use axum::extract::State;
use tempfile::TempDir;

use shared::DataEnvelope;
use shared::models::{Document, STATUS_ERROR, STATUS_PROCESSING, Unit};

use super::handler::{self, DocumentCreate};
use crate::core::{AiConfig, Config, DriveConfig, NotionConfig, ServerState};

fn test_state(dir: &TempDir) -> ServerState {
    let config = Config {
        work_dir: dir.path().to_string_lossy().into_owned(),
        http_port: 0,
        base_url: "http://localhost:3001".into(),
        // AI 端点不可达，提取立即落入兜底路径
        request_timeout_ms: 100,
        news_refresh_minutes: 30,
        drive: DriveConfig {
            parent_folder_id: None,
            credentials_json: None,
            credentials_file: dir.path().join("missing-credentials.json"),
        },
        notion: NotionConfig {
            api_key: None,
            investors_db_id: None,
            documents_db_id: None,
        },
        ai: AiConfig {
            api_url: "http://127.0.0.1:9/chat/completions".into(),
            customer_id: None,
            auth_token: None,
            model: "test-model".into(),
        },
    };
    ServerState::initialize(&config).unwrap()
}

fn payload(doc_type: &str, category: &str, file_data: Option<&str>) -> DataEnvelope<DocumentCreate> {
    DataEnvelope {
        data: Some(DocumentCreate {
            id: None,
            investor_id: Some("test-investor-1".into()),
            unit_id: None,
            category: Some(category.into()),
            doc_type: Some(doc_type.into()),
            name: Some("passport.pdf".into()),
            file_data: file_data.map(String::from),
            file_type: Some("application/pdf".into()),
            file_size: Some(4),
        }),
    }
}

#[tokio::test]
async fn document_without_file_is_stored_as_processing() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let Json(response) = handler::create_with_category(
        State(state.clone()),
        Json(payload("Passport", "Personal Documents", None)),
    )
    .await
    .unwrap();

    assert!(response.success);
    assert_eq!(response.data.status, STATUS_PROCESSING);
    assert_eq!(response.data.category.as_deref(), Some("Personal Documents"));
    assert!(response.extracted_data.is_none());
    // 没有文件也没有目标文件夹，两个外部位置都未写入
    assert!(!response.storage_locations.local);
    assert!(!response.storage_locations.google_drive);
    // 没有文件可传不产生 Drive warning
    assert!(response.warnings.is_empty());

    let stored = state.store.documents.len().await;
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn corrupt_payload_marks_document_as_error() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    // data-URL 缺分隔符 → 本地落盘失败 → 记录标记 Error 但仍然持久化
    let Json(response) = handler::create_with_category(
        State(state.clone()),
        Json(payload("Passport", "Personal Documents", Some("not-a-data-url"))),
    )
    .await
    .unwrap();

    assert!(response.success);
    assert_eq!(response.data.status, STATUS_ERROR);
    assert!(response.data.file_url.is_none());
    assert!(!response.warnings.is_empty());
    assert_eq!(state.store.documents.len().await, 1);
}

#[tokio::test]
async fn unknown_investor_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let mut body = payload("Passport", "Personal Documents", None);
    body.data.as_mut().unwrap().investor_id = Some("no-such-investor".into());

    let result = handler::create_with_category(State(state), Json(body)).await;
    assert!(result.is_err());
}

fn unit(id: &str, name: &str) -> Unit {
    Unit {
        id: id.into(),
        investor_id: "test-investor-1".into(),
        name: Some(name.into()),
        unit_name: None,
        unit_number: None,
        project: None,
        unit_type: None,
        area: None,
        unit_details: None,
        developer: None,
        amount: None,
        sqft: None,
        current_value: None,
        purchase_value: None,
        monthly_rental: None,
        occupancy_status: None,
        location: None,
        google_drive_folder_id: None,
        google_drive_error: None,
        folder_creation_attempts: None,
        created_at: None,
    }
}

fn doc(file_name: &str, category: &str, unit_id: Option<&str>, target_folder: &str) -> Document {
    Document {
        document_id: "1".into(),
        id: file_name.into(),
        investor_id: "test-investor-1".into(),
        investor_name: "Test Investor".into(),
        unit_id: unit_id.map(String::from),
        document_type: None,
        file_name: file_name.into(),
        upload_date: "2026-01-01".into(),
        status: STATUS_PROCESSING.into(),
        file_url: None,
        category: Some(category.into()),
        original_category: None,
        extracted_data: None,
        file_type: None,
        file_size: None,
        amount: None,
        google_drive: None,
        google_drive_error: None,
        target_folder: Some(target_folder.into()),
        target_folder_id: None,
        notion_id: None,
        persistence_metadata: None,
    }
}

#[test]
fn grouping_respects_persisted_categories() {
    let units = vec![unit("unit-1", "Marina Heights")];
    let documents = vec![
        doc("contract.pdf", "Marina Heights", Some("unit-1"), "unit_specific"),
        doc("passport.pdf", "Personal Documents", None, "personal_documents"),
        // Personal 分类带 unitId 也不进单元桶
        doc("visa.pdf", "Personal Documents", Some("unit-1"), "personal_documents"),
        doc("misc.pdf", "Other Documents", None, "default_other"),
        doc("orphan.pdf", "Other Documents", Some("gone-unit"), "unit_not_found_fallback"),
    ];

    let grouped = handler::group_documents(&documents, &units);

    assert_eq!(grouped["Marina Heights"].len(), 1);
    assert_eq!(grouped["Personal Documents"].len(), 2);
    assert_eq!(grouped["Other Documents"].len(), 2);
}
