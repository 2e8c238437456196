use collector::sink::ExtractRow;
use collector::{City, Collector, CollectorSettings, Config, JsonFileBackend, MemoryBackend, StateBackend};
use places_client::testing::{MockRequest, MockTransport};
use places_client::{PlacesError, PLACES_DETAILS_URL, PLACES_SEARCH_URL};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn config(output_dir: &Path, engine_id: Option<&str>) -> Config {
    let output_dir = output_dir.to_string_lossy().to_string();
    Config::from_lookup(move |key: &str| match key {
        "GOOGLE_API_KEY" => Some("test-key".to_string()),
        "CUSTOM_SEARCH_ENGINE_ID" => engine_id.map(str::to_string),
        "COLLECTOR_OUTPUT_DIR" => Some(output_dir.clone()),
        _ => None,
    })
    .unwrap()
}

fn settings(keywords: &[&str]) -> CollectorSettings {
    CollectorSettings::default()
        .with_concurrency(4)
        .with_keywords(keywords.iter().map(|k| k.to_string()).collect())
        .with_pagination_delay(Duration::from_millis(1))
        .with_backoff_base(Duration::from_millis(1))
}

fn campinas() -> City {
    City::new("Campinas", &["Cambuí"])
}

fn details(name: &str, lat: Value, lng: Value) -> Value {
    json!({
        "status": "OK",
        "result": {
            "name": name,
            "formatted_address": format!("Rua {name}, 10 - Cambuí, Campinas - SP"),
            "rating": 4.5,
            "formatted_phone_number": "(19) 3333-0000",
            "types": ["pharmacy", "store"],
            "geometry": {"location": {"lat": lat, "lng": lng}},
            "user_ratings_total": 42
        }
    })
}

/// Search always returns `ids`; details answer per id.
fn upstream(ids: &'static [&'static str]) -> MockTransport {
    MockTransport::new(move |req: &MockRequest| {
        if req.url.starts_with(PLACES_SEARCH_URL) {
            let results: Vec<Value> = ids
                .iter()
                .map(|id| json!({"place_id": id, "name": id}))
                .collect();
            return Ok(json!({"status": "OK", "results": results}));
        }
        if req.url.starts_with(PLACES_DETAILS_URL) {
            return Ok(match req.param("place_id") {
                Some("missing") => json!({"status": "NOT_FOUND"}),
                Some("broken") => return Err(PlacesError::http(404, req.url.clone())),
                Some("nowhere") => details("nowhere", json!("abc"), json!(-47.0)),
                Some(id) => details(id, json!(-22.9), json!(-47.05)),
                None => json!({}),
            });
        }
        if req.param("cx").is_some() {
            return Ok(json!({"items": [{"link": "https://instagram.com/drogaria"}]}));
        }
        Err(PlacesError::Network(format!("unexpected url {}", req.url)))
    })
}

fn read_rows(path: &Path) -> Vec<ExtractRow> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_collects_new_places_and_records_them() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(upstream(&["a", "b"]));
    let backend = Arc::new(MemoryBackend::new());

    let collector = Collector::build(
        transport.clone(),
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        backend.clone(),
    )
    .await
    .unwrap();

    let report = collector.run(&[campinas()]).await;
    let city = &report.cities[0];

    assert_eq!(city.candidates, 2);
    assert_eq!(city.new_ids, 2);
    assert_eq!(city.enriched, 2);
    assert_eq!(city.written, 2);
    assert!(!city.skipped);
    assert_eq!(backend.stored().len(), 2);

    let rows = read_rows(&dir.path().join("farmacias_Campinas.json"));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].place_id, "a");
    assert_eq!(rows[0].category, "Farmácia");
    assert_eq!(rows[0].types, "pharmacy, store");
    assert_eq!(rows[0].neighborhood, "10 - Cambuí");
    assert!(rows[0].social_links.is_empty());
}

#[tokio::test]
async fn test_repeated_hits_fetch_details_once() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(upstream(&["a", "b", "a"]));

    let collector = Collector::build(
        transport.clone(),
        &config(dir.path(), None),
        &settings(&["farmácia", "drogaria"]),
        Arc::new(MemoryBackend::new()),
    )
    .await
    .unwrap();

    let report = collector.run(&[campinas()]).await;

    assert_eq!(report.cities[0].candidates, 6);
    assert_eq!(report.cities[0].new_ids, 2);
    assert_eq!(transport.calls_to(PLACES_DETAILS_URL).len(), 2);
}

#[tokio::test]
async fn test_failed_details_drop_only_that_place() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(upstream(&["a", "missing", "broken", "b"]));
    let backend = Arc::new(MemoryBackend::new());

    let collector = Collector::build(
        transport,
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        backend.clone(),
    )
    .await
    .unwrap();

    let report = collector.run(&[campinas()]).await;
    let city = &report.cities[0];

    assert_eq!(city.new_ids, 4);
    assert_eq!(city.enriched, 2);
    assert_eq!(city.dropped, 2);
    assert_eq!(city.written, 2);

    let stored = backend.stored();
    assert!(stored.contains("a") && stored.contains("b"));
    assert!(!stored.contains("missing"));
}

#[tokio::test]
async fn test_invalid_coordinates_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(upstream(&["a", "nowhere"]));
    let backend = Arc::new(MemoryBackend::new());

    let collector = Collector::build(
        transport,
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        backend.clone(),
    )
    .await
    .unwrap();

    let report = collector.run(&[campinas()]).await;

    assert_eq!(report.cities[0].invalid_coordinates, 1);
    assert_eq!(report.cities[0].written, 1);
    // Still processed, so it is not fetched again next run.
    assert!(backend.stored().contains("nowhere"));

    let rows = read_rows(&dir.path().join("farmacias_Campinas.json"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].place_id, "a");
}

#[tokio::test]
async fn test_second_run_finds_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("processed_place_ids.json");

    let first = Arc::new(upstream(&["a", "b"]));
    let collector = Collector::build(
        first,
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        Arc::new(JsonFileBackend::new(&state_file)),
    )
    .await
    .unwrap();
    assert_eq!(collector.run(&[campinas()]).await.total_written(), 2);

    let second = Arc::new(upstream(&["a", "b"]));
    let collector = Collector::build(
        second.clone(),
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        Arc::new(JsonFileBackend::new(&state_file)),
    )
    .await
    .unwrap();
    let report = collector.run(&[campinas()]).await;

    assert_eq!(report.cities[0].new_ids, 0);
    assert!(report.cities[0].skipped);
    assert_eq!(report.total_enriched(), 0);
    assert!(second.calls_to(PLACES_DETAILS_URL).is_empty());

    // The skipped city keeps the previous extract.
    let rows = read_rows(&dir.path().join("farmacias_Campinas.json"));
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_previously_processed_ids_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(upstream(&["a", "b"]));
    let backend = Arc::new(MemoryBackend::with_ids(["a"]));

    let collector = Collector::build(
        transport.clone(),
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        backend.clone(),
    )
    .await
    .unwrap();

    let report = collector.run(&[campinas()]).await;

    assert_eq!(report.cities[0].new_ids, 1);
    let fetched: Vec<_> = transport
        .calls_to(PLACES_DETAILS_URL)
        .iter()
        .filter_map(|c| c.param("place_id").map(str::to_string))
        .collect();
    assert_eq!(fetched, ["b"]);
    assert_eq!(backend.stored().len(), 2);
}

#[tokio::test]
async fn test_next_page_results_are_merged() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(MockTransport::new(|req: &MockRequest| {
        if req.param("pagetoken") == Some("page-2") {
            return Ok(json!({"status": "OK", "results": [{"place_id": "b"}]}));
        }
        if req.url.starts_with(PLACES_SEARCH_URL) {
            return Ok(json!({
                "status": "OK",
                "results": [{"place_id": "a"}],
                "next_page_token": "page-2"
            }));
        }
        let id = req.param("place_id").unwrap_or("?");
        Ok(details(id, json!(-22.9), json!(-47.05)))
    }));

    let collector = Collector::build(
        transport,
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        Arc::new(MemoryBackend::new()),
    )
    .await
    .unwrap();

    let report = collector.run(&[campinas()]).await;

    assert_eq!(report.cities[0].candidates, 2);
    assert_eq!(report.cities[0].written, 2);
}

#[tokio::test]
async fn test_social_links_only_with_engine_id() {
    let dir = tempfile::tempdir().unwrap();

    let with_engine = Arc::new(upstream(&["a"]));
    let collector = Collector::build(
        with_engine.clone(),
        &config(dir.path(), Some("engine")),
        &settings(&["farmácia"]),
        Arc::new(MemoryBackend::new()),
    )
    .await
    .unwrap();
    collector.run(&[campinas()]).await;

    let rows = read_rows(&dir.path().join("farmacias_Campinas.json"));
    assert_eq!(rows[0].social_links, ["https://instagram.com/drogaria"]);

    let without_engine = Arc::new(upstream(&["a"]));
    let collector = Collector::build(
        without_engine.clone(),
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        Arc::new(MemoryBackend::new()),
    )
    .await
    .unwrap();
    collector.run(&[campinas()]).await;

    assert!(without_engine.calls().iter().all(|c| c.param("cx").is_none()));
}

#[tokio::test]
async fn test_corrupt_state_file_fails_build() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("ids.json");
    std::fs::write(&state_file, "not json").unwrap();

    let backend: Arc<dyn StateBackend> = Arc::new(JsonFileBackend::new(&state_file));
    let result = Collector::build(
        Arc::new(upstream(&[])),
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        backend,
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_failed_details_keep_previous_extract() {
    let dir = tempfile::tempdir().unwrap();
    let extract = dir.path().join("farmacias_Campinas.json");
    std::fs::write(&extract, r#"[{"PlaceID":"old"}]"#).unwrap();

    let transport = Arc::new(MockTransport::new(|req: &MockRequest| {
        if req.url.starts_with(PLACES_SEARCH_URL) {
            return Ok(json!({"status": "OK", "results": [{"place_id": "a"}]}));
        }
        Err(PlacesError::http(403, req.url.clone()))
    }));
    let backend = Arc::new(MemoryBackend::new());

    let collector = Collector::build(
        transport,
        &config(dir.path(), None),
        &settings(&["farmácia"]),
        backend.clone(),
    )
    .await
    .unwrap();
    let report = collector.run(&[campinas()]).await;
    let city = &report.cities[0];

    assert_eq!(city.enriched, 0);
    assert_eq!(city.dropped, 1);
    assert!(city.skipped);
    assert_eq!(std::fs::read_to_string(&extract).unwrap(), r#"[{"PlaceID":"old"}]"#);
    assert!(backend.stored().is_empty());
}

#[tokio::test]
async fn test_empty_search_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let collector = Collector::build(
        Arc::new(upstream(&[])),
        &config(&out, None),
        &settings(&["farmácia"]),
        Arc::new(MemoryBackend::new()),
    )
    .await
    .unwrap();
    let report = collector.run(&[campinas()]).await;

    assert_eq!(report.total_written(), 0);
    assert!(!out.exists());
}
