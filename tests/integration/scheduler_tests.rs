use super::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn test_passes_never_overlap_when_slower_than_interval() -> anyhow::Result<()> {
    let products = vec![product("a"), product("b")];
    let driver = ScriptedDriver::new(&[
        (products[0].url.as_str(), PageScript::Shows("2 in stock")),
        (products[1].url.as_str(), PageScript::Shows("4 in stock")),
    ])
    .with_page_delay(Duration::from_secs(8));
    let log = Arc::clone(&driver.log);

    // Each pass takes 16s against a 10s interval.
    let scheduler = scheduler_for(driver, products.clone(), Duration::from_secs(10));
    let (tx, mut rx) = mpsc::channel(4);
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(tx, shutdown.clone()));

    for _ in 0..8 {
        rx.recv().await.expect("outcome");
    }
    shutdown.cancel();
    handle.await??;

    let log = log.lock().unwrap().clone();
    assert!(log.len() >= 8);

    // Configuration order is kept within each pass.
    for (i, record) in log.iter().enumerate() {
        assert_eq!(record.url, products[i % 2].url);
    }

    // No probe starts before the previous one has finished.
    for pair in log.windows(2) {
        let finished = pair[0].finished.expect("probe finished");
        assert!(pair[1].started >= finished);
    }

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_waits_full_interval_between_passes() -> anyhow::Result<()> {
    let only = product("a");
    let driver = ScriptedDriver::new(&[(only.url.as_str(), PageScript::Shows("1 in stock"))]);
    let interval = Duration::from_secs(300);
    let scheduler = scheduler_for(driver, vec![only], interval);

    let (tx, mut rx) = mpsc::channel(4);
    let shutdown = CancellationToken::new();
    let start = tokio::time::Instant::now();
    let handle = tokio::spawn(scheduler.run(tx, shutdown.clone()));

    let first = rx.recv().await.expect("initial pass");
    assert!(first.is_success());
    assert!(start.elapsed() < interval);

    let second = rx.recv().await.expect("second pass");
    assert!(second.is_success());
    assert!(start.elapsed() >= interval);

    shutdown.cancel();
    handle.await??;
    assert!(rx.recv().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_cancelled_before_start_probes_nothing() -> anyhow::Result<()> {
    let only = product("a");
    let driver = ScriptedDriver::new(&[(only.url.as_str(), PageScript::Shows("1 in stock"))]);
    let log = Arc::clone(&driver.log);
    let scheduler = scheduler_for(driver, vec![only], Duration::from_secs(60));

    let (tx, mut rx) = mpsc::channel(4);
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    scheduler.run(tx, shutdown).await?;

    assert!(rx.recv().await.is_none());
    assert!(log.lock().unwrap().is_empty());
    Ok(())
}
