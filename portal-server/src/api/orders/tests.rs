use axum::Json;
use axum::extract::State;
use tempfile::TempDir;

use shared::DataEnvelope;
use shared::models::{OrderCreate, OrderItem};

use super::handler;
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

fn order_payload() -> DataEnvelope<OrderCreate> {
    DataEnvelope {
        data: Some(OrderCreate {
            id: None,
            investor_id: Some("test-investor-1".into()),
            items: vec![OrderItem {
                service_id: Some("svc-1".into()),
                name: Some("Property valuation".into()),
                price: 500.0,
                quantity: 1,
            }],
            total_amount: 500.0,
            status: None,
            created_at: None,
        }),
    }
}

#[tokio::test]
async fn order_round_trips_through_store() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let Json(created) = handler::create(State(state.clone()), Json(order_payload()))
        .await
        .unwrap();
    assert!(created.success);
    assert_eq!(created.data.status, "pending");

    // 重开 store 验证确实写到了 orders.json
    let reopened = crate::store::Store::open(
        &dir.path().join("data"),
        &dir.path().join("uploads"),
    )
    .unwrap();
    let count = reopened.orders.len().await;
    assert_eq!(count, 1);

    let Json(listed) = handler::list_for_investor(
        State(state),
        Json(InvestorIdBody {
            investor_id: Some("test-investor-1".into()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(listed.data.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let mut body = order_payload();
    body.data.as_mut().unwrap().items.clear();

    let result = handler::create(State(state), Json(body)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn status_update_returns_404_for_unknown_order() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let result = handler::update_status(
        State(state),
        Json(handler::OrderStatusUpdate {
            order_id: Some("missing".into()),
            status: Some("paid".into()),
            bank_transfer_proof: None,
        }),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn status_update_records_proof_and_timestamp() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir);

    let Json(created) = handler::create(State(state.clone()), Json(order_payload()))
        .await
        .unwrap();

    let Json(updated) = handler::update_status(
        State(state),
        Json(handler::OrderStatusUpdate {
            order_id: Some(created.data.id.clone()),
            status: Some("paid".into()),
            bank_transfer_proof: Some("transfer-123.pdf".into()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(updated.data.status, "paid");
    assert_eq!(updated.data.bank_transfer_proof.as_deref(), Some("transfer-123.pdf"));
    assert!(updated.data.updated_at.is_some());
}
