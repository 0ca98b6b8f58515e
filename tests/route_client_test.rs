use atm_finder::adapters::RouteClient;
use atm_finder::core::RoutingService;
use atm_finder::{FinderError, GeoPoint};
use httpmock::prelude::*;
use std::time::Duration;

fn origin() -> GeoPoint {
    GeoPoint::new(39.9200, 32.8540).unwrap()
}

fn destination() -> GeoPoint {
    GeoPoint::new(39.9415, 32.8549).unwrap()
}

#[tokio::test]
async fn test_fetches_primary_route_geometry() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("/directions/driving/32.854000,39.920000")
            .path_contains("32.854900,39.941500")
            .query_param("geometries", "geojson")
            .query_param("alternatives", "false")
            .query_param("access_token", "pk.test");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "code": "Ok",
                "routes": [
                    {
                        "geometry": {
                            "type": "LineString",
                            "coordinates": [[32.854, 39.92], [32.8545, 39.93], [32.8549, 39.9415]]
                        },
                        "distance": 2480.3,
                        "duration": 322.5
                    }
                ]
            }));
    });

    let client = RouteClient::new(server.url("/directions"), Duration::from_secs(5))
        .unwrap()
        .with_access_token("pk.test");
    let route = client.request_route(origin(), destination()).await.unwrap();

    api_mock.assert();
    assert_eq!(route.points.len(), 3);
    assert_eq!(route.points[0], origin());
    assert_eq!(route.points[2], destination());
    assert_eq!(route.distance_meters, Some(2480.3));
    assert_eq!(route.duration_seconds, Some(322.5));
}

#[tokio::test]
async fn test_custom_profile_is_used() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET).path_contains("/walking/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "routes": [{"geometry": {"coordinates": [[32.854, 39.92], [32.8549, 39.9415]]}}]
            }));
    });

    let client = RouteClient::new(server.url("/directions"), Duration::from_secs(5))
        .unwrap()
        .with_profile("walking");
    let route = client.request_route(origin(), destination()).await.unwrap();

    api_mock.assert();
    assert_eq!(route.points.len(), 2);
    assert_eq!(route.distance_meters, None);
}

#[tokio::test]
async fn test_identical_points_return_degenerate_route() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET);
        then.status(500);
    });

    let client = RouteClient::new(server.url("/directions"), Duration::from_secs(5)).unwrap();
    let route = client.request_route(origin(), origin()).await.unwrap();

    api_mock.assert_hits(0);
    assert!(route.is_degenerate());
    assert_eq!(route.points, vec![origin()]);
}

#[tokio::test]
async fn test_empty_route_list_is_a_routing_error() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path_contains("/driving/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"code": "Ok", "routes": []}));
    });

    let client = RouteClient::new(server.url("/directions"), Duration::from_secs(5)).unwrap();
    let result = client.request_route(origin(), destination()).await;

    assert!(matches!(result, Err(FinderError::RoutingService { .. })));
}

#[tokio::test]
async fn test_structured_api_error_is_reported() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path_contains("/driving/");
        then.status(422)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"code": "NoSegment", "message": "No road segment could be matched"}));
    });

    let client = RouteClient::new(server.url("/directions"), Duration::from_secs(5)).unwrap();
    let err = client.request_route(origin(), destination()).await.unwrap_err();

    assert!(matches!(err, FinderError::RoutingService { .. }));
    assert!(err.to_string().contains("NoSegment"));
}

#[tokio::test]
async fn test_unreachable_service_is_a_routing_error() {
    // 沒有服務在這個埠上
    let client = RouteClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let result = client.request_route(origin(), destination()).await;

    assert!(matches!(result, Err(FinderError::RoutingService { .. })));
}
