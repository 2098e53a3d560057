mod common;

use common::{As, TestApp, assert_error};
use http::StatusCode;
use serde_json::{Value, json};
use shared::error::ErrorCode;

async fn restaurant_with_tables(app: &TestApp, tables: i64) -> (String, i64) {
    let (manager, restaurant_id) = app.register("boss@example.com", "Mamma Mia").await;
    let (status, body) = app
        .send("POST", "/api/tables", As::Staff(&manager), Some(json!({ "count": tables })))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (manager, restaurant_id)
}

fn occupied(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .filter(|t| t["is_occupied"].as_bool().unwrap())
        .map(|t| t["table_number"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_claim_reconnect_and_conflict() {
    let app = TestApp::new().await;
    let (manager, restaurant_id) = restaurant_with_tables(&app, 3).await;
    let claim = json!({ "restaurant_id": restaurant_id, "table_number": 2 });

    let (status, body) = app.send("POST", "/api/session", As::Anonymous, Some(claim.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["outcome"], "created");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .send("POST", "/api/session", As::Customer(&token), Some(claim.clone()))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["outcome"], "reconnected");
    assert_eq!(body["token"], token.as_str());

    let (status, body) = app
        .send("POST", "/api/session", As::Customer("someone-else"), Some(claim))
        .await;
    assert_error(status, &body, ErrorCode::TableInUse);

    let (status, body) = app
        .send(
            "POST",
            "/api/session",
            As::Anonymous,
            Some(json!({ "restaurant_id": restaurant_id, "table_number": 9 })),
        )
        .await;
    assert_error(status, &body, ErrorCode::TableNotFound);

    let (_, body) = app.send("GET", "/api/tables", As::Staff(&manager), None).await;
    assert_eq!(occupied(&body), vec![2]);
}

#[tokio::test]
async fn test_release_frees_table() {
    let app = TestApp::new().await;
    let (manager, restaurant_id) = restaurant_with_tables(&app, 2).await;
    let first = app.seat(restaurant_id, 1).await;
    app.seat(restaurant_id, 2).await;

    let (status, body) = app.send("GET", "/api/session", As::Customer(&first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table_number"], 1);

    let (status, body) = app.send("DELETE", "/api/session", As::Customer(&first), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, body) = app.send("DELETE", "/api/session", As::Customer(&first), None).await;
    assert_error(status, &body, ErrorCode::SessionNotFound);
    let (status, body) = app.send("GET", "/api/session", As::Customer(&first), None).await;
    assert_error(status, &body, ErrorCode::SessionNotFound);

    // staff clear the other table
    let (status, _) = app.send("DELETE", "/api/sessions/2", As::Staff(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.send("DELETE", "/api/sessions/2", As::Staff(&manager), None).await;
    assert_error(status, &body, ErrorCode::SessionNotFound);

    let (_, body) = app.send("GET", "/api/tables", As::Staff(&manager), None).await;
    assert!(occupied(&body).is_empty());

    // a freed table can be claimed again
    app.seat(restaurant_id, 1).await;
}

#[tokio::test]
async fn test_occupied_table_cannot_be_removed() {
    let app = TestApp::new().await;
    let (manager, restaurant_id) = restaurant_with_tables(&app, 2).await;
    app.seat(restaurant_id, 1).await;

    let (status, body) = app.send("DELETE", "/api/tables/1", As::Staff(&manager), None).await;
    assert_error(status, &body, ErrorCode::TableOccupied);
    let (status, _) = app.send("DELETE", "/api/tables/2", As::Staff(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_assistance_round_trip() {
    let app = TestApp::new().await;
    let (manager, restaurant_id) = restaurant_with_tables(&app, 2).await;
    let customer = app.seat(restaurant_id, 1).await;

    let (status, body) = app.send("POST", "/api/assistance", As::Customer(&customer), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["outcome"], "requested");
    let (status, body) = app.send("POST", "/api/assistance", As::Customer(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_requested");

    let (_, body) = app.send("GET", "/api/assistance", As::Staff(&manager), None).await;
    assert_eq!(body, json!([1]));

    let (status, body) = app
        .send("POST", "/api/assistance/2/toggle", As::Customer(&customer), None)
        .await;
    assert_error(status, &body, ErrorCode::PermissionDenied);

    let (status, _) = app.send("DELETE", "/api/assistance/1", As::Staff(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.send("GET", "/api/assistance", As::Staff(&manager), None).await;
    assert_eq!(body, json!([]));

    let (status, body) = app
        .send("POST", "/api/assistance/1/toggle", As::Customer(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["need_assistance"], true);
}
