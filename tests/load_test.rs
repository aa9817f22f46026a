//! Load testing for the proxy.

use std::collections::HashMap;
use std::time::Instant;

use futures_util::future::join_all;

mod common;

#[tokio::test]
async fn test_concurrent_rotation_under_load() {
    // 1. Setup Mock Backends
    let backends = vec![
        common::start_mock_backend("b1").await,
        common::start_mock_backend("b2").await,
        common::start_mock_backend("b3").await,
    ];

    // 2. Start Proxy
    let (proxy, shutdown) = common::start_proxy(common::config_for(&backends)).await;

    // 3. Run Load Test
    let concurrency = 20;
    let requests_per_task = 30;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let tasks = (0..concurrency).map(|_| {
        let client = client.clone();
        tokio::spawn(async move {
            let mut results = Vec::new();
            for _ in 0..requests_per_task {
                let req_start = Instant::now();
                if let Ok(res) = client.get(format!("http://{}/", proxy)).send().await {
                    if res.status().is_success() {
                        if let Ok(body) = res.text().await {
                            results.push((body, req_start.elapsed()));
                        }
                    }
                }
            }
            results
        })
    });

    let mut hits: HashMap<String, usize> = HashMap::new();
    let mut latencies = Vec::new();
    for result in join_all(tasks).await {
        for (body, latency) in result.unwrap() {
            *hits.entry(body).or_default() += 1;
            latencies.push(latency);
        }
    }

    let duration = start.elapsed();
    assert_eq!(latencies.len(), total_requests, "every request should succeed");

    // Rotation is approximate under concurrency but covers every backend.
    assert_eq!(hits.len(), 3);
    for (backend, count) in &hits {
        assert!(*count >= total_requests / 6, "{} only got {} hits", backend, count);
    }

    latencies.sort();
    let p50 = latencies[latencies.len() / 2];
    let p99 = latencies[(latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", total_requests as f64 / duration.as_secs_f64());
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("Distribution:   {:?}", hits);
    println!("-------------------------\n");

    shutdown.trigger();
}
