mod support;

use serde_json::Value;
use std::time::Duration;

async fn latest_snapshot(http: &reqwest::Client, base_url: &str) -> Value {
    for _ in 0..50 {
        let res = http
            .get(format!("{base_url}/tank"))
            .send()
            .await
            .expect("request should succeed");
        if res.status() == reqwest::StatusCode::OK {
            return res.json().await.expect("snapshot should be json");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("tank never published a snapshot");
}

#[tokio::test]
async fn when_server_starts_then_tank_snapshot_lists_the_default_sample() {
    let base_url = support::ensure_server();
    let http = reqwest::Client::new();

    let snapshot = latest_snapshot(&http, base_url).await;

    let entities = snapshot["entities"].as_array().expect("entities array");
    assert!(!entities.is_empty());
    let ids: Vec<u64> = entities.iter().filter_map(|e| e["id"].as_u64()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn when_tank_is_resized_then_later_snapshots_report_the_new_bounds() {
    let base_url = support::ensure_server();
    let http = reqwest::Client::new();

    let res = http
        .post(format!("{base_url}/tank/resize"))
        .json(&serde_json::json!({ "width": 10.0, "height": 6.0, "depth": 4.0 }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::ACCEPTED);

    for _ in 0..50 {
        let snapshot = latest_snapshot(&http, base_url).await;
        if snapshot["bounds"]["max"] == serde_json::json!([5.0, 3.0, 2.0]) {
            for e in snapshot["entities"].as_array().expect("entities array") {
                let x = e["position"][0].as_f64().expect("x");
                assert!((-5.0..=5.0).contains(&x));
            }
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("resize never reached the tank");
}
