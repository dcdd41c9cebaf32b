mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use finance_api::database::Store;
use finance_api::types::Role;

#[tokio::test]
async fn submit_computes_revenue_and_profit() -> Result<()> {
    let app = TestApp::new();
    let (user, token) = app.login_as("Ada", "ada@example.com", Role::User).await?;

    let res = app
        .post(
            "/finance/submit",
            Some(&token),
            json!({ "inputData": { "unitsSold": 10, "pricePerUnit": 5, "cost": 20 } }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.data()["calculatedResult"]["totalRevenue"], 50.0);
    assert_eq!(res.data()["calculatedResult"]["profit"], 30.0);

    let records = app.store.list_records().await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record.user_id, user.id);
    assert_eq!(records[0].record.input_data.units_sold, 10.0);
    Ok(())
}

#[tokio::test]
async fn submit_accepts_numeric_strings_and_negative_profit() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.login_as("Ada", "ada@example.com", Role::User).await?;

    let res = app
        .post(
            "/finance/submit",
            Some(&token),
            json!({ "inputData": { "unitsSold": "4", "pricePerUnit": "2.5", "cost": 25 } }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.data()["calculatedResult"]["totalRevenue"], 10.0);
    assert_eq!(res.data()["calculatedResult"]["profit"], -15.0);
    Ok(())
}

#[tokio::test]
async fn unauthenticated_submit_stores_nothing() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post(
            "/finance/submit",
            None,
            json!({ "inputData": { "unitsSold": 10, "pricePerUnit": 5, "cost": 20 } }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(app.store.list_records().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn incomplete_submission_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.login_as("Ada", "ada@example.com", Role::User).await?;

    let res = app.post("/finance/submit", Some(&token), json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field_errors"]["inputData"], "This field is required");

    let res = app
        .post("/finance/submit", Some(&token), json!({ "inputData": { "unitsSold": 3, "cost": 1 } }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["inputData.pricePerUnit"].is_string());

    assert!(app.store.list_records().await?.is_empty());
    Ok(())
}
