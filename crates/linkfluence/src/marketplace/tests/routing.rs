use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::marketplace::applications::ApplicationRepository;
use crate::marketplace::domain::Role;

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serializable")))
        .expect("request builds")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    (status, read_json_body(response).await)
}

#[tokio::test]
async fn register_route_creates_identities() {
    let (marketplace, _) = build_marketplace();
    let router = marketplace.router();

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/users",
            json!({ "role": "creator", "name": "Ada", "profile": { "bio": "Travel" } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "creator");
    assert_eq!(body["cached_rating"]["count"], 0);
    let id = body["id"].as_str().expect("id rendered as string");

    let (status, body) = send(&router, get_request(&format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");

    let (status, body) = send(&router, get_request("/api/users/usr-missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn campaign_routes_cover_the_lifecycle() {
    let scenario = scenario();
    let router = scenario.marketplace.router();

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/campaigns",
            json!({
                "business_id": scenario.business.id,
                "title": "Winter Sale",
                "description": "Short videos",
                "budget": 900.0,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let campaign_id = body["campaign_id"].as_str().expect("campaign id").to_string();

    let (status, body) = send(
        &router,
        json_request(
            Method::PATCH,
            &format!("/api/campaigns/{campaign_id}"),
            json!({ "budget": 1200.0, "status": "closed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budget"], 1200.0);
    assert_eq!(body["status"], "active", "status is not editable through a patch");

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/campaigns/{campaign_id}/close"),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");

    let (status, body) = send(
        &router,
        get_request(&format!("/api/campaigns?business_id={}", scenario.business.id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/campaigns/{campaign_id}"))
        .body(Body::empty())
        .expect("request builds");
    let (status, _) = send(&router, delete).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, get_request(&format!("/api/campaigns/{campaign_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn campaign_creation_without_business_is_bad_request() {
    let (marketplace, _) = build_marketplace();
    let router = marketplace.router();

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/campaigns",
            json!({ "title": "Launch", "description": "Videos", "budget": 10 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("business_id")));
}

#[tokio::test]
async fn application_routes_map_outcomes_to_status_codes() {
    let scenario = scenario();
    let router = scenario.marketplace.router();
    let payload = json!({
        "campaign_id": scenario.campaign.id,
        "creator_id": scenario.creator.id,
        "cover_letter": "Pick me",
        "bid_amount": 300.0,
    });

    let (status, body) = send(
        &router,
        json_request(Method::POST, "/api/applications", payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["application"]["status"], "pending");
    let application_id = body["application_id"].as_str().expect("id").to_string();

    let (status, _) = send(
        &router,
        json_request(Method::POST, "/api/applications", payload),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let status_uri = format!("/api/applications/{application_id}/status");
    let (status, _) = send(
        &router,
        json_request(Method::PATCH, &status_uri, json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        json_request(Method::PATCH, &status_uri, json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application"]["status"], "accepted");

    let (status, _) = send(
        &router,
        json_request(Method::PATCH, &status_uri, json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &router,
        json_request(
            Method::PATCH,
            "/api/applications/app-missing/status",
            json!({ "status": "accepted" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &router,
        get_request(&format!(
            "/api/applications/campaign/{}",
            scenario.campaign.id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        &router,
        get_request(&format!(
            "/api/applications/creator/{}",
            scenario.creator.id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], application_id.as_str());
}

#[tokio::test]
async fn review_routes_report_aggregate() {
    let scenario = scenario();
    let router = scenario.marketplace.router();

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/reviews",
            json!({
                "creator_id": scenario.creator.id,
                "reviewer_id": scenario.business.id,
                "rating": 4,
                "comment": "Solid",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/reviews",
            json!({
                "creator_id": scenario.creator.id,
                "reviewer_id": scenario.business.id,
                "rating": 5,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/reviews",
            json!({
                "creator_id": scenario.creator.id,
                "reviewer_id": scenario.business.id,
                "rating": 4.5,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        get_request(&format!("/api/reviews/creator/{}", scenario.creator.id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_rating"], 4.0);
    assert_eq!(body["review_count"], 1);
    assert_eq!(body["reviews"][0]["reviewer_name"], "Acme");
}

#[tokio::test]
async fn message_routes_project_conversations() {
    let scenario = scenario();
    let router = scenario.marketplace.router();

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/messages",
            json!({
                "campaign_id": scenario.campaign.id,
                "sender_id": scenario.creator.id,
                "receiver_id": scenario.business.id,
                "content": "When do we start?",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["message_id"].is_string());

    let (status, body) = send(
        &router,
        get_request(&format!(
            "/api/messages/conversation?campaign_id={}&creator_id={}&business_id={}",
            scenario.campaign.id, scenario.creator.id, scenario.business.id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"][0]["content"], "When do we start?");

    let (status, _) = send(
        &router,
        get_request(&format!(
            "/api/messages/conversation?campaign_id={}",
            scenario.campaign.id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        get_request(&format!(
            "/api/messages/conversations?user_id={}",
            scenario.business.id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversations"][0]["message_count"], 1);
}

#[tokio::test]
async fn notification_routes_list_and_mark_read() {
    let scenario = scenario();
    let router = scenario.marketplace.router();
    apply(&scenario.marketplace, &scenario.campaign, &scenario.creator);

    let (status, body) = send(
        &router,
        get_request(&format!(
            "/api/notifications?user_id={}",
            scenario.business.id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread_count"], 1);
    assert_eq!(body["notifications"][0]["type"], "new_application");
    assert_eq!(
        body["notifications"][0]["campaign_id"],
        scenario.campaign.id.as_str()
    );
    let notification_id = body["notifications"][0]["id"]
        .as_str()
        .expect("id")
        .to_string();

    let read_uri = format!("/api/notifications/{notification_id}/read");
    for _ in 0..2 {
        let (status, body) = send(
            &router,
            json_request(Method::POST, &read_uri, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["read"], true);
    }

    let (status, body) = send(
        &router,
        get_request(&format!(
            "/api/notifications/unread-count?user_id={}",
            scenario.business.id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread_count"], 0);

    let (status, _) = send(&router, get_request("/api/notifications")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &router,
        json_request(Method::POST, "/api/notifications/ntf-missing/read", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn campaign_route_rejects_negative_budget() {
    let (marketplace, _) = build_marketplace();
    let business = register(&marketplace, Role::Business, "Acme");
    let router = marketplace.router();

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/campaigns",
            json!({
                "business_id": business.id,
                "title": "Launch",
                "description": "Videos",
                "budget": -3,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn incomplete_application_body_is_bad_request() {
    let scenario = scenario();
    let router = scenario.marketplace.router();

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/applications",
            json!({ "campaign_id": scenario.campaign.id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("creator_id")));
    assert!(scenario
        .store
        .applications_for_campaign(&scenario.campaign.id)
        .expect("listed")
        .is_empty());
}

#[tokio::test]
async fn review_without_numeric_rating_is_bad_request() {
    let scenario = scenario();
    let router = scenario.marketplace.router();

    for payload in [
        json!({
            "creator_id": scenario.creator.id,
            "reviewer_id": scenario.business.id,
        }),
        json!({
            "creator_id": scenario.creator.id,
            "reviewer_id": scenario.business.id,
            "rating": "4",
        }),
    ] {
        let (status, body) = send(
            &router,
            json_request(Method::POST, "/api/reviews", payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (_, body) = send(
        &router,
        get_request(&format!("/api/reviews/creator/{}", scenario.creator.id)),
    )
    .await;
    assert_eq!(body["review_count"], 0);
}

#[tokio::test]
async fn malformed_json_is_bad_request_on_every_write_route() {
    let scenario = scenario();
    let router = scenario.marketplace.router();

    for (method, uri) in [
        (Method::POST, "/api/users".to_string()),
        (Method::POST, "/api/campaigns".to_string()),
        (Method::POST, "/api/messages".to_string()),
        (Method::PATCH, format!("/api/campaigns/{}", scenario.campaign.id)),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .expect("request builds");
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}
