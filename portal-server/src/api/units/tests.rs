use axum::Json;
use axum::extract::State;
use tempfile::TempDir;

use shared::DataEnvelope;
use shared::models::Unit;

use super::handler::{self, UnitForceCreate};
use crate::api::InvestorIdBody;
use crate::core::{AiConfig, Config, DriveConfig, NotionConfig, ServerState};

fn test_state(dir: &TempDir) -> ServerState {
    let config = Config {
        work_dir: dir.path().to_string_lossy().into_owned(),
        http_port: 0,
        base_url: "http://localhost:3001".into(),
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

fn unit(id: &str, name: &str, purchase_value: Option<f64>) -> Unit {
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
        purchase_value,
        monthly_rental: None,
        occupancy_status: None,
        location: None,
        google_drive_folder_id: None,
        google_drive_error: None,
        folder_creation_attempts: None,
        created_at: None,
    }
}

#[tokio::test]
async fn projection_flags_portfolio_membership() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);
    state
        .store
        .units
        .mutate(|units| {
            units.push(unit("unit-1", "Marina Heights", Some(250000.0)));
            units.push(unit("unit-2", "Harbour View", Some(0.0)));
        })
        .await
        .unwrap();

    let Json(listed) = handler::list_for_investor(
        State(state.clone()),
        Json(InvestorIdBody {
            investor_id: Some("test-investor-1".into()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(listed.total, 2);
    let by_name = |name: &str| listed.data.iter().find(|u| u.unit_name == name).unwrap();
    assert!(by_name("Marina Heights").in_portfolio);
    assert!(!by_name("Harbour View").in_portfolio);

    // 补录购入价后进入持仓
    state
        .store
        .units
        .mutate(|units| {
            if let Some(u) = units.iter_mut().find(|u| u.id == "unit-2") {
                u.purchase_value = Some(300000.0);
            }
        })
        .await
        .unwrap();

    let Json(relisted) = handler::list_for_investor(
        State(state),
        Json(InvestorIdBody {
            investor_id: Some("test-investor-1".into()),
        }),
    )
    .await
    .unwrap();
    assert!(
        relisted
            .data
            .iter()
            .find(|u| u.unit_name == "Harbour View")
            .unwrap()
            .in_portfolio
    );
}

#[tokio::test]
async fn force_create_requires_main_drive_folder() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    // 种子投资人没有主 Drive 文件夹
    let body = DataEnvelope {
        data: Some(UnitForceCreate {
            investor_id: Some("test-investor-1".into()),
            name: Some("Marina Heights".into()),
            unit_name: None,
            unit_number: None,
            project: None,
            developer: None,
            unit_type: None,
            area: None,
            sqft: None,
            current_value: None,
            purchase_value: None,
            monthly_rental: None,
            occupancy_status: None,
            location: None,
        }),
    };

    let result = handler::create_with_force_folder(State(state), Json(body)).await;
    assert!(result.is_err());
}
