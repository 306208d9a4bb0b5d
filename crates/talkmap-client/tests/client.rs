//! Integration tests for the collaborator clients using wiremock HTTP mocks.

use serde_json::json;
use talkmap_client::{ApiClient, TravelMode};
use talkmap_core::{ErrorKind, GeoPoint};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::with_base_url(base_url, 5).expect("client construction should not fail")
}

fn reference() -> GeoPoint {
    GeoPoint::new(31.2397, 121.4994).unwrap()
}

fn pearl_tower() -> GeoPoint {
    GeoPoint::new(31.2404, 121.4998).unwrap()
}

fn parse_ok_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "category": "咖啡店",
            "subcategory": null,
            "radius": 1000,
            "limit": 10,
            "sort_by": "distance",
            "filters": {
                "location": {"lat": 31.2404, "lng": 121.4998},
                "brands": ["星巴克"],
                "proximity": null
            }
        },
        "display": {"location": "东方明珠塔", "type": "咖啡店", "range": "1.0公里", "count": "10个", "sort": "distance"}
    })
}

fn result_json(id: &str, name: &str, distance: f64) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "category": "咖啡厅",
        "address": "陆家嘴环路1288号",
        "location": {"lat": 31.2410, "lng": 121.5001},
        "distance": distance,
        "phone": "021-12345678"
    })
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[tokio::test]
async fn parse_sends_message_and_location_and_returns_intent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/parse-query"))
        .and(body_partial_json(json!({
            "message": "东方明珠塔附近1公里内的星巴克",
            "location": {"lat": 31.2397, "lng": 121.4994}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(parse_ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).parser();
    let intent = client
        .parse("  东方明珠塔附近1公里内的星巴克  ", reference())
        .await
        .expect("should parse intent");

    assert_eq!(intent.category, "咖啡店");
    assert_eq!(intent.radius, 1000);
    assert_eq!(intent.limit, 10);
    assert_eq!(intent.sort_by.as_str(), "distance");
    assert_eq!(intent.filters.location, Some(pearl_tower()));
    assert_eq!(intent.display.kind, "咖啡店");
}

#[tokio::test]
async fn parse_blank_text_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parse_ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).parser();
    let err = client.parse("   ", reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn parse_reported_failure_is_parse_failed_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/parse-query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "无法识别位置"})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).parser();
    let err = client.parse("火星上的咖啡店", reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParseFailed);
    assert_eq!(err.message, "无法识别位置");
}

#[tokio::test]
async fn parse_rejection_with_partial_data_is_parse_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/parse-query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "无法识别位置",
            "data": {"radius": "far"},
            "display": "n/a"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).parser();
    let err = client.parse("火星上的咖啡店", reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParseFailed);
    assert_eq!(err.message, "无法识别位置");
}

#[tokio::test]
async fn parse_server_error_is_network_error_with_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/parse-query"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "解析失败: LLM timeout"})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).parser();
    let err = client.parse("星巴克", reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(err.message.contains("500"), "message: {}", err.message);
    assert!(err.message.contains("LLM timeout"), "message: {}", err.message);
}

#[tokio::test]
async fn parse_non_json_body_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/parse-query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).parser();
    let err = client.parse("星巴克", reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}

#[tokio::test]
async fn parse_missing_required_field_is_protocol_error() {
    let server = MockServer::start().await;

    let mut body = parse_ok_body();
    body["data"].as_object_mut().unwrap().remove("limit");

    Mock::given(method("POST"))
        .and(path("/api/parse-query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).parser();
    let err = client.parse("星巴克", reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Protocol);
    assert!(err.message.contains("limit"), "message: {}", err.message);
}

#[tokio::test]
async fn parse_timeout_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/parse-query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(parse_ok_body())
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = ApiClient::with_base_url(&server.uri(), 1)
        .expect("client construction should not fail")
        .parser();
    let err = client.parse("星巴克", reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}

#[tokio::test]
async fn unreachable_collaborator_is_network_error() {
    let client = test_client("http://127.0.0.1:1").parser();
    let err = client.parse("星巴克", reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_is_centred_on_parsed_location_and_preserves_order() {
    let server = MockServer::start().await;

    let api = test_client(&server.uri());

    Mock::given(method("POST"))
        .and(path("/api/parse-query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parse_ok_body()))
        .mount(&server)
        .await;

    // Deliberately not sorted by distance: the collaborator's order is the rank.
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({
            "category": "咖啡店",
            "radius": 1000,
            "limit": 10,
            "sort_by": "distance",
            "brands": ["星巴克"],
            "location": {"lat": 31.2404, "lng": 121.4998}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "total": 3,
                "results": [
                    result_json("c", "星巴克(滨江店)", 640.0),
                    result_json("a", "星巴克(东方明珠店)", 85.0),
                    result_json("b", "星巴克(正大广场店)", 410.0)
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let intent = api
        .parser()
        .parse("东方明珠塔附近1公里内的星巴克", reference())
        .await
        .expect("should parse");
    let results = api
        .searcher()
        .search(&intent, reference())
        .await
        .expect("should search");

    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["c", "a", "b"]);
    assert_eq!(results[1].phone.as_deref(), Some("021-12345678"));
}

#[tokio::test]
async fn search_reported_failure_is_search_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": {"total": 0, "results": []},
            "message": "未找到符合条件的地点，请尝试放宽搜索条件"
        })))
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let intent = talkmap_core::QueryIntent {
        category: "酒店".into(),
        subcategory: None,
        radius: 500,
        limit: 3,
        sort_by: talkmap_core::SortBy::new("距离最近"),
        filters: talkmap_core::Filters::default(),
        display: talkmap_core::DisplayEcho::default(),
    };
    let err = api.searcher().search(&intent, reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SearchFailed);
    assert_eq!(err.message, "未找到符合条件的地点，请尝试放宽搜索条件");
}

#[tokio::test]
async fn search_rejection_with_incomplete_data_is_search_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "未找到",
            "data": {"results": [{"id": "x"}]}
        })))
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let intent = talkmap_core::QueryIntent {
        category: "咖啡店".into(),
        subcategory: None,
        radius: 1000,
        limit: 10,
        sort_by: talkmap_core::SortBy::new("距离最近"),
        filters: talkmap_core::Filters::default(),
        display: talkmap_core::DisplayEcho::default(),
    };
    let err = api.searcher().search(&intent, reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SearchFailed);
    assert_eq!(err.message, "未找到");
}

#[tokio::test]
async fn search_result_without_location_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "results": [
                    {"id": "x", "name": "n", "category": "c", "address": "a", "distance": 3.0}
                ]
            }
        })))
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let intent = talkmap_core::QueryIntent {
        category: "酒店".into(),
        subcategory: None,
        radius: 500,
        limit: 3,
        sort_by: talkmap_core::SortBy::new("distance"),
        filters: talkmap_core::Filters::default(),
        display: talkmap_core::DisplayEcho::default(),
    };
    let err = api.searcher().search(&intent, reference()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Protocol);
}

#[tokio::test]
async fn search_success_with_empty_results_is_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({"location": {"lat": 31.2397, "lng": 121.4994}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"total": 0, "results": []}})),
        )
        .mount(&server)
        .await;

    let api = test_client(&server.uri());
    let intent = talkmap_core::QueryIntent {
        category: "地铁站".into(),
        subcategory: None,
        radius: 3000,
        limit: 5,
        sort_by: talkmap_core::SortBy::new("distance"),
        filters: talkmap_core::Filters::default(),
        display: talkmap_core::DisplayEcho::default(),
    };
    let results = api
        .searcher()
        .search(&intent, reference())
        .await
        .expect("empty success is not an error");
    assert!(results.is_empty());
}

// ---------------------------------------------------------------------------
// route + health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn route_returns_plan() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/route"))
        .and(body_partial_json(json!({
            "origin": {"lat": 31.2397, "lng": 121.4994},
            "destination": {"lat": 31.2404, "lng": 121.4998},
            "mode": "walking"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "distance": 120.0,
                "duration": 1.6,
                "mode": "walking",
                "steps": [
                    {"instruction": "向东步行80米", "distance": 80.0, "duration": 1.1},
                    {"instruction": "到达目的地", "distance": 40.0, "duration": 0.5}
                ]
            }
        })))
        .mount(&server)
        .await;

    let plan = test_client(&server.uri())
        .router()
        .plan(reference(), pearl_tower(), TravelMode::Walking)
        .await
        .expect("should plan route");
    assert!((plan.distance - 120.0).abs() < f64::EPSILON);
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[1].instruction, "到达目的地");
}

#[tokio::test]
async fn route_rejection_is_route_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "无法规划路线，请检查起点和终点"
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .router()
        .plan(reference(), pearl_tower(), TravelMode::Driving)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RouteFailed);
}

#[tokio::test]
async fn route_rejection_ignores_malformed_plan() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "起点和终点相同",
            "data": {"distance": null}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .router()
        .plan(reference(), reference(), TravelMode::Walking)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RouteFailed);
    assert_eq!(err.message, "起点和终点相同");
}

#[tokio::test]
async fn health_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let status = test_client(&server.uri())
        .health()
        .await
        .expect("health should succeed");
    assert_eq!(status, "ok");
}
