use super::*;

use shared::models::Unit;

use tempfile::TempDir;

fn test_store(dir: &TempDir) -> Store {
    Store::open(&dir.path().join("data"), &dir.path().join("uploads")).unwrap()
}

fn test_investor() -> Investor {
    let mut investor = Investor::seed();
    investor.google_drive_folder_id = Some("root-folder".to_string());
    investor.personal_docs_folder_id = Some("personal-folder".to_string());
    investor
}

fn test_unit(id: &str, folder_id: Option<&str>) -> Unit {
    Unit {
        id: id.to_string(),
        investor_id: "test-investor-1".to_string(),
        name: Some("Marina Heights".to_string()),
        unit_name: None,
        unit_number: Some("1204".to_string()),
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
        google_drive_folder_id: folder_id.map(String::from),
        google_drive_error: None,
        folder_creation_attempts: None,
        created_at: None,
    }
}

#[tokio::test]
async fn unit_document_takes_unit_name_as_category() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    store
        .units
        .mutate(|units| units.push(test_unit("unit-1", Some("unit-folder"))))
        .await
        .unwrap();

    let result = resolve(
        &store,
        &DriveService::disabled(),
        &test_investor(),
        Some(CATEGORY_UNIT_DOCUMENTS),
        Some("Contract"),
        Some("unit-1"),
    )
    .await;

    assert_eq!(result.category, "Marina Heights");
    assert_eq!(result.folder_type, FolderType::UnitSpecific);
    assert_eq!(result.target_folder_id.as_deref(), Some("unit-folder"));
    assert_eq!(result.attempts, 0);
}

#[tokio::test]
async fn personal_documents_never_reassigned_to_unit() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    store
        .units
        .mutate(|units| units.push(test_unit("unit-1", Some("unit-folder"))))
        .await
        .unwrap();

    // 申报了 Personal 分类，即使带着合法 unitId 也归个人文件夹
    let result = resolve(
        &store,
        &DriveService::disabled(),
        &test_investor(),
        Some(CATEGORY_PERSONAL),
        Some("Passport"),
        Some("unit-1"),
    )
    .await;

    assert_eq!(result.category, CATEGORY_PERSONAL);
    assert_eq!(result.folder_type, FolderType::PersonalDocuments);
    assert_eq!(result.target_folder_id.as_deref(), Some("personal-folder"));
}

#[tokio::test]
async fn unknown_unit_falls_back_to_other_documents() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let result = resolve(
        &store,
        &DriveService::disabled(),
        &test_investor(),
        Some(CATEGORY_UNIT_DOCUMENTS),
        None,
        Some("no-such-unit"),
    )
    .await;

    assert_eq!(result.category, CATEGORY_OTHER);
    assert_eq!(result.folder_type, FolderType::UnitNotFoundFallback);
    assert_eq!(result.target_folder_id.as_deref(), Some("root-folder"));
}

#[tokio::test]
async fn folder_creation_failure_falls_back_to_main_folder() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    store
        .units
        .mutate(|units| units.push(test_unit("unit-1", None)))
        .await
        .unwrap();

    // Drive 未配置 → 三次尝试都失败 → 回落投资人主文件夹
    let result = resolve(
        &store,
        &DriveService::disabled(),
        &test_investor(),
        Some(CATEGORY_UNIT_DOCUMENTS),
        None,
        Some("unit-1"),
    )
    .await;

    assert_eq!(result.category, "Marina Heights");
    assert_eq!(result.folder_type, FolderType::MainInvestorFallback);
    assert_eq!(result.target_folder_id.as_deref(), Some("root-folder"));
    assert_eq!(result.attempts, MAX_FOLDER_ATTEMPTS);
    assert!(result.folder_error.is_some());
}

#[tokio::test]
async fn unit_folder_is_created_and_persisted() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    store
        .units
        .mutate(|units| units.push(test_unit("unit-1", None)))
        .await
        .unwrap();

    let drive = DriveService::stubbed();
    let investor = test_investor();
    let result = resolve(
        &store,
        &drive,
        &investor,
        Some(CATEGORY_UNIT_DOCUMENTS),
        None,
        Some("unit-1"),
    )
    .await;

    assert_eq!(result.category, "Marina Heights");
    assert_eq!(result.folder_type, FolderType::UnitCreated);
    assert_eq!(result.attempts, 1);
    assert_eq!(
        result.target_folder_id.as_deref(),
        Some("root-folder::Marina Heights (1204)")
    );

    // 新文件夹 id 已回写到单元记录
    let persisted = store
        .units
        .read(|units| units[0].google_drive_folder_id.clone())
        .await;
    assert_eq!(persisted, result.target_folder_id);

    // 后续上传直接复用，不再走创建路径
    let again = resolve(
        &store,
        &drive,
        &investor,
        Some(CATEGORY_UNIT_DOCUMENTS),
        None,
        Some("unit-1"),
    )
    .await;
    assert_eq!(again.folder_type, FolderType::UnitSpecific);
    assert_eq!(again.target_folder_id, persisted);
    assert_eq!(again.attempts, 0);
}

#[tokio::test]
async fn default_bucket_prefers_personal_folder() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let result = resolve(
        &store,
        &DriveService::disabled(),
        &test_investor(),
        None,
        Some("Invoice"),
        None,
    )
    .await;

    assert_eq!(result.category, CATEGORY_OTHER);
    assert_eq!(result.folder_type, FolderType::DefaultOther);
    assert_eq!(result.target_folder_id.as_deref(), Some("personal-folder"));
}

#[tokio::test]
async fn resolution_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    store
        .units
        .mutate(|units| units.push(test_unit("unit-1", Some("unit-folder"))))
        .await
        .unwrap();

    let investor = test_investor();
    let drive = DriveService::disabled();
    let first = resolve(
        &store,
        &drive,
        &investor,
        Some(CATEGORY_UNIT_DOCUMENTS),
        None,
        Some("unit-1"),
    )
    .await;
    let second = resolve(
        &store,
        &drive,
        &investor,
        Some(CATEGORY_UNIT_DOCUMENTS),
        None,
        Some("unit-1"),
    )
    .await;

    assert_eq!(first.category, second.category);
    assert_eq!(first.folder_type, second.folder_type);
    assert_eq!(first.target_folder_id, second.target_folder_id);
}
