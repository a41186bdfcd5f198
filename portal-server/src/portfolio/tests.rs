use super::*;

use serde_json::{Value, json};
use shared::models::{Document, ExtractedData, STATUS_PROCESSED};

fn doc(investor_id: &str, doc_type: &str, extracted_amount: Option<Value>) -> Document {
    Document {
        document_id: "1".into(),
        id: uuid::Uuid::new_v4().to_string(),
        investor_id: investor_id.into(),
        investor_name: "Test".into(),
        unit_id: None,
        document_type: Some(doc_type.into()),
        file_name: format!("{}.pdf", doc_type.to_lowercase()),
        upload_date: "2026-01-01".into(),
        status: STATUS_PROCESSED.into(),
        file_url: None,
        category: None,
        original_category: None,
        extracted_data: extracted_amount.map(|amount| ExtractedData {
            doc_type: Some(doc_type.into()),
            document_id: None,
            passport_number: None,
            full_name: None,
            expiry_date: None,
            investor_name: None,
            unit_details: Some("Marina Heights (1204)".into()),
            sqft: None,
            amount: Some(amount),
            developer: Some("Emaar".into()),
            id_number: None,
            date_uploaded: None,
        }),
        file_type: None,
        file_size: None,
        amount: None,
        google_drive: None,
        google_drive_error: None,
        target_folder: None,
        target_folder_id: None,
        notion_id: None,
        persistence_metadata: None,
    }
}

#[test]
fn single_otp_drives_portfolio_value() {
    let docs = vec![
        doc("inv-1", "OTP", Some(json!(250000))),
        doc("inv-1", "Passport", None),
    ];

    let value = compute(&docs, "inv-1");
    assert_eq!(value.portfolio_value, 250000.0);
    assert_eq!(value.formatted_value, "$250,000.00");
    assert_eq!(value.otp_count, 1);
    assert_eq!(value.total_documents, 2);
    assert_eq!(value.breakdown.len(), 1);
    assert_eq!(value.breakdown[0].developer, "Emaar");
}

#[test]
fn other_investors_documents_are_ignored() {
    let docs = vec![
        doc("inv-1", "OTP", Some(json!(100000))),
        doc("inv-2", "OTP", Some(json!(999999))),
    ];

    let value = compute(&docs, "inv-1");
    assert_eq!(value.portfolio_value, 100000.0);
    assert_eq!(value.total_documents, 1);
}

#[test]
fn zero_amount_otps_count_but_stay_out_of_breakdown() {
    let docs = vec![
        doc("inv-1", "OTP", None),
        doc("inv-1", "OTP", Some(json!("garbage"))),
    ];

    let value = compute(&docs, "inv-1");
    assert!(value.portfolio_value == 0.0);
    assert_eq!(value.formatted_value, "$0.00");
    assert_eq!(value.otp_count, 2);
    assert!(value.breakdown.is_empty());
}

#[test]
fn no_documents_is_an_empty_portfolio() {
    let value = compute(&[], "inv-1");
    assert_eq!(value.portfolio_value, 0.0);
    assert_eq!(value.otp_count, 0);
    assert_eq!(value.total_documents, 0);
    assert!(value.breakdown.is_empty());
}

#[test]
fn usd_formatting_groups_thousands() {
    assert_eq!(format_usd(0.0), "$0.00");
    assert_eq!(format_usd(999.5), "$999.50");
    assert_eq!(format_usd(1000.0), "$1,000.00");
    assert_eq!(format_usd(1234567.89), "$1,234,567.89");
    assert_eq!(format_usd(-2500.0), "-$2,500.00");
}
