use super::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

fn open_store(dir: &tempfile::TempDir) -> Store {
    Store::open(&dir.path().join("data"), &dir.path().join("uploads")).unwrap()
}

#[tokio::test]
async fn investors_seeded_when_file_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let seeded = store.investors.read(|inv| inv.to_vec()).await;
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded[0].id, "test-investor-1");
    assert_eq!(seeded[0].email, "investor1@test.com");
}

#[tokio::test]
async fn mutation_is_flushed_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open_store(&dir);
        store
            .units
            .mutate(|units| {
                units.push(shared::models::Unit {
                    id: "u1".into(),
                    investor_id: "test-investor-1".into(),
                    name: Some("Apartment 2A".into()),
                    unit_name: None,
                    unit_number: Some("2A".into()),
                    project: None,
                    unit_type: None,
                    area: None,
                    unit_details: None,
                    developer: None,
                    amount: None,
                    sqft: None,
                    current_value: None,
                    purchase_value: Some(250000.0),
                    monthly_rental: None,
                    occupancy_status: None,
                    location: None,
                    google_drive_folder_id: None,
                    google_drive_error: None,
                    folder_creation_attempts: None,
                    created_at: None,
                });
            })
            .await
            .unwrap();
    }

    // Fresh store over the same directory sees the persisted unit
    let store = open_store(&dir);
    let loaded = store.units.read(|units| units.to_vec()).await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].display_name(), "Apartment 2A");
    assert_eq!(loaded[0].folder_name(), "Apartment 2A (2A)");
}

#[tokio::test]
async fn corrupt_collection_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("documents.json"), "{not json").unwrap();

    let store = open_store(&dir);
    assert_eq!(store.documents.len().await, 0);
}

#[test]
fn save_file_locally_writes_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let data = format!("data:application/pdf;base64,{}", STANDARD.encode(b"%PDF-"));
    let url = store.save_file_locally(&data, "contract.pdf").unwrap();

    assert!(url.starts_with("/uploads/contract_"));
    assert!(url.ends_with(".pdf"));
    let on_disk = dir
        .path()
        .join("uploads")
        .join(url.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(on_disk).unwrap(), b"%PDF-");
}

#[test]
fn save_file_locally_rejects_corrupt_payload() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    assert!(store.save_file_locally("no-comma-here", "x.pdf").is_err());
    assert!(store.save_file_locally("data:app/pdf;base64,", "x.pdf").is_err());
}
