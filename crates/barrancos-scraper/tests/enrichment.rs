//! Integration tests for the enrichment client and lookup loops.
//!
//! Each test stands up a local `wiremock` server; no real network traffic
//! is made.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use barrancos_scraper::{
    enrich_coordinates, enrich_wikiloc_links, CoordinateOptions, EnrichSummary, EnrichmentClient,
    ScraperError, WikilocOptions,
};

fn test_client() -> EnrichmentClient {
    EnrichmentClient::new(5, "barrancos-test/0.1", 0, 0, &[]).expect("failed to build test client")
}

fn coordinate_options(server: &MockServer) -> CoordinateOptions {
    CoordinateOptions {
        base_url: format!("{}/canyoning/canyon-carte", server.uri()),
        zoom: 14.0,
        delay: Duration::ZERO,
        limit: None,
        start: 0,
    }
}

fn wikiloc_options(server: &MockServer) -> WikilocOptions {
    WikilocOptions {
        base_url: server.uri(),
        activity: "46".to_owned(),
        result_limit: 10,
        radius_km: None,
        default_radius_km: 15.0,
        map_params: None,
        use_map: true,
        delay: Duration::ZERO,
        limit: None,
    }
}

// ---------------------------------------------------------------------------
// EnrichmentClient::fetch_text
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_text_sends_accept_and_session_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("accept", "text/html"))
        .and(header("cookie", "JSESSIONID=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let client = EnrichmentClient::new(
        5,
        "barrancos-test/0.1",
        0,
        0,
        &[("Cookie".to_owned(), "JSESSIONID=abc".to_owned())],
    )
    .expect("client");
    let body = client
        .fetch_text(&format!("{}/page", server.uri()), "text/html")
        .await
        .expect("fetch should succeed");
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn fetch_text_maps_rate_limit_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_text(&server.uri(), "text/html")
        .await
        .unwrap_err();
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, 30),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_text_maps_not_found_and_other_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client();
    let missing = client
        .fetch_text(&format!("{}/missing", server.uri()), "text/html")
        .await;
    assert!(matches!(missing, Err(ScraperError::NotFound { .. })));

    let broken = client
        .fetch_text(&format!("{}/broken", server.uri()), "text/html")
        .await;
    assert!(matches!(
        broken,
        Err(ScraperError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn fetch_text_retries_rate_limits_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("second try"))
        .mount(&server)
        .await;

    let client = EnrichmentClient::new(5, "barrancos-test/0.1", 2, 0, &[]).expect("client");
    let body = client
        .fetch_text(&server.uri(), "text/html")
        .await
        .expect("retry should succeed");
    assert_eq!(body, "second try");
}

// ---------------------------------------------------------------------------
// enrich_coordinates
// ---------------------------------------------------------------------------

const MAP_PAGE: &str = r"<script>
    new google.maps.Marker({position: new google.maps.LatLng(42.28,-0.05),type: 'parking'});
    new google.maps.Marker({position: new google.maps.LatLng(42.29,-0.06),type: 'depart'});
</script>";

#[tokio::test]
async fn enrich_coordinates_updates_records_and_skips_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/canyoning/canyon-carte/100/carte.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MAP_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/canyoning/canyon-carte/200/carte.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/canyoning/canyon-carte/300/carte.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no map</html>"))
        .mount(&server)
        .await;

    let mut dataset = vec![
        json!({"id": "100", "nombre": "Peonera"}),
        json!({"nombre": "Sin id"}),
        json!({"id": 200}),
        json!({"id": "300"}),
    ];
    let summary = enrich_coordinates(&test_client(), &mut dataset, &coordinate_options(&server)).await;

    assert_eq!(
        summary,
        EnrichSummary {
            processed: 3,
            updated: 1
        }
    );
    assert_eq!(
        dataset[0]["coordinates"],
        json!({"lat": 42.29, "lng": -0.06, "zoom": 14.0})
    );
    assert_eq!(dataset[0]["descente_markers"].as_array().unwrap().len(), 2);
    assert!(dataset[2].get("coordinates").is_none());
    assert!(dataset[3].get("coordinates").is_none());
}

#[tokio::test]
async fn enrich_coordinates_honours_start_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MAP_PAGE))
        .mount(&server)
        .await;

    let mut dataset = vec![json!({"id": "1"}), json!({"id": "2"}), json!({"id": "3"})];
    let options = CoordinateOptions {
        limit: Some(1),
        start: 1,
        ..coordinate_options(&server)
    };
    let summary = enrich_coordinates(&test_client(), &mut dataset, &options).await;

    assert_eq!(summary.processed, 1);
    assert!(dataset[0].get("coordinates").is_none());
    assert!(dataset[1].get("coordinates").is_some());
    assert!(dataset[2].get("coordinates").is_none());
}

// ---------------------------------------------------------------------------
// enrich_wikiloc_links
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wikiloc_map_endpoint_link_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/find.do"))
        .and(query_param("event", "map"))
        .and(query_param("text", "Peonera"))
        .and(query_param("act", "46"))
        .and(query_param("minLat", "42.165253"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spas": [{"url": "/trails/canyoning/peonera-1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut dataset = vec![json!({
        "nombre": "Peonera (Huesca)",
        "provincia": "Huesca",
        "coordinates": {"lat": 42.3, "lng": -0.05}
    })];
    let summary = enrich_wikiloc_links(&test_client(), &mut dataset, &wikiloc_options(&server)).await;

    assert_eq!(summary.updated, 1);
    assert_eq!(
        dataset[0]["wikiloc_aproximacion"],
        format!("{}/trails/canyoning/peonera-1", server.uri())
    );
}

#[tokio::test]
async fn wikiloc_falls_back_to_html_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/find.do"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wikiloc/find.do"))
        .and(query_param("q", "Gorgas Negras"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div><a class="trail-title" href="/trails/canyoning/gorgas-negras-7">Gorgas</a></div>"#,
        ))
        .mount(&server)
        .await;

    let mut dataset = vec![json!({"name": "Gorgas Negras"})];
    let summary = enrich_wikiloc_links(&test_client(), &mut dataset, &wikiloc_options(&server)).await;

    assert_eq!(summary.updated, 1);
    assert_eq!(
        dataset[0]["wikiloc_aproximacion"],
        format!("{}/trails/canyoning/gorgas-negras-7", server.uri())
    );
}

#[tokio::test]
async fn wikiloc_skips_linked_records_and_respects_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut dataset = vec![
        json!({"name": "Vero", "wikiloc": {"approach": "https://w/1"}}),
        json!({"name": "Mascún"}),
    ];
    let options = WikilocOptions {
        limit: Some(1),
        ..wikiloc_options(&server)
    };
    let summary = enrich_wikiloc_links(&test_client(), &mut dataset, &options).await;

    assert_eq!(
        summary,
        EnrichSummary {
            processed: 1,
            updated: 0
        }
    );
    assert!(dataset[1].get("wikiloc_aproximacion").is_none());
}

#[tokio::test]
async fn wikiloc_failures_are_logged_and_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut dataset = vec![json!({"name": "Vero"}), json!({"name": "Mascún"})];
    let options = WikilocOptions {
        use_map: false,
        ..wikiloc_options(&server)
    };
    let summary = enrich_wikiloc_links(&test_client(), &mut dataset, &options).await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.updated, 0);
}
