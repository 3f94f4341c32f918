use std::time::Duration;

use rand::Rng;

use farrun::invoke;
use farrun::proxy::MailboxFactory;
use farrun::Isolate;
use farrun::Outcome;
use farrun::Runtime;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// --- Test 1: Runtime lifecycle ---

#[tokio::test]
async fn test_runtime_spawn_and_shutdown() -> anyhow::Result<()> {
    init_tracing();
    let rt = Runtime::new();

    let id = rt.spawn_isolate("worker")?;
    assert!(rt.handle(id).is_some());

    rt.shutdown(id)?;
    assert!(rt.handle(id).is_none());
    assert!(rt.shutdown(id).is_err());
    Ok(())
}

// --- Test 2: Dispatch through the runtime front door ---

#[tokio::test]
async fn test_runtime_invoke_round_trip() -> anyhow::Result<()> {
    init_tracing();
    let rt = Runtime::new();
    let id = rt.spawn_isolate("adder")?;

    let future = rt
        .invoke(id, (3i32, 4i32), |a: i32, b: i32| async move {
            Outcome::Completed(a + b)
        })
        .await?;

    assert_eq!(future.wait().await, Outcome::Completed(7));
    rt.shutdown(id)?;
    Ok(())
}

// --- Test 3: Unknown ids never cross ---

#[tokio::test]
async fn test_unknown_isolate_is_invalid_argument() -> anyhow::Result<()> {
    init_tracing();
    let rt = Runtime::new();
    let id = rt.spawn_isolate("short-lived")?;
    rt.shutdown(id)?;

    let err = rt
        .invoke(id, (), || async { Outcome::Completed(0u32) })
        .await
        .unwrap_err();

    match err {
        invoke::Error::InvalidArgument(_) => {}
        other => panic!("Expected InvalidArgument, got {:?}", other),
    }
    Ok(())
}

// --- Test 4: Concurrent calls across several isolates ---

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_invocations_stay_independent() -> anyhow::Result<()> {
    init_tracing();
    let rt = std::sync::Arc::new(Runtime::new());
    let ids = vec![
        rt.spawn_isolate("pool-a")?,
        rt.spawn_isolate("pool-b")?,
        rt.spawn_isolate("pool-c")?,
    ];

    let mut joins = Vec::new();
    for n in 0u32..24 {
        let rt = rt.clone();
        let id = ids[n as usize % ids.len()];
        joins.push(tokio::spawn(async move {
            let jitter = rand::thread_rng().gen_range(0..20);
            let future = rt
                .invoke(id, (n,), move |v: u32| async move {
                    tokio::time::sleep(Duration::from_millis(jitter)).await;
                    Outcome::Completed(v * 2)
                })
                .await
                .expect("dispatch should succeed");
            (n, future.wait().await)
        }));
    }

    for join in joins {
        let (n, outcome) = join.await?;
        // Every call observes exactly its own result.
        assert_eq!(outcome, Outcome::Completed(n * 2));
    }

    for id in ids {
        rt.shutdown(id)?;
    }
    Ok(())
}

// --- Test 5: Faults and cancellations arrive intact end to end ---

#[tokio::test]
async fn test_terminal_states_end_to_end() -> anyhow::Result<()> {
    init_tracing();
    let rt = Runtime::new();
    let id = rt.spawn_isolate("mixed")?;

    let faulted = rt
        .invoke(id, (), || async { Outcome::<u32>::fault("boom") })
        .await?;
    let cancelled = rt
        .invoke(id, (), || async { Outcome::<u32>::Cancelled })
        .await?;
    let completed = rt
        .invoke(id, ("seven",), |s: &'static str| async move {
            Outcome::Completed(s.len())
        })
        .await?;

    let outcome = faulted.wait().await;
    assert_eq!(outcome.faults().map(|f| f[0].message()), Some("boom"));
    assert!(cancelled.wait().await.is_cancelled());
    assert_eq!(completed.wait().await, Outcome::Completed(5));

    rt.shutdown(id)?;
    Ok(())
}

// --- Test 6: Shutdown under an in-flight operation ---

#[tokio::test]
async fn test_shutdown_midflight_faults_the_future() -> anyhow::Result<()> {
    init_tracing();
    let isolate = Isolate::spawn("doomed")?;
    let handle = isolate.handle();

    let future = invoke(&MailboxFactory, &handle, (), || async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Outcome::Completed(0u32)
    })
    .await?;

    // The relay is attached once dispatch returns; tear the context down
    // underneath the running operation.
    tokio::task::spawn_blocking(move || isolate.shutdown()).await?;

    // The operation died with the runtime, so its promise dropped and the
    // future must fault promptly instead of hanging.
    let outcome = tokio::time::timeout(Duration::from_secs(5), future.wait()).await?;
    let faults = outcome.faults().expect("expected a faulted outcome");
    assert!(faults[0].message().contains("dropped before resolving"));
    Ok(())
}

// --- Test 7: Dispatch racing a shutdown ---

#[tokio::test(flavor = "multi_thread")]
async fn test_dispatch_racing_shutdown_never_hangs() -> anyhow::Result<()> {
    init_tracing();

    // Repeat to land on both sides of the race: the envelope can be
    // rejected outright, discarded behind the shutdown message, or accepted
    // and executed. Every path must resolve; none may hang.
    for _ in 0..16 {
        let isolate = Isolate::spawn("racer")?;
        let handle = isolate.handle();
        let shutdown = tokio::task::spawn_blocking(move || isolate.shutdown());

        let dispatched = invoke(&MailboxFactory, &handle, (), || async {
            Outcome::Completed(1u32)
        })
        .await;

        match dispatched {
            Ok(future) => {
                let outcome =
                    tokio::time::timeout(Duration::from_secs(5), future.wait()).await?;
                assert!(outcome.is_completed() || outcome.is_faulted());
            }
            Err(invoke::Error::InvalidArgument(_)) => {}
            Err(invoke::Error::Boundary(_)) => {}
        }

        shutdown.await?;
    }
    Ok(())
}

// --- Test 8: Standalone isolate with the public dispatcher ---

#[tokio::test]
async fn test_free_function_dispatch() -> anyhow::Result<()> {
    init_tracing();
    let isolate = Isolate::spawn("standalone")?;
    let handle = isolate.handle();

    let future = invoke(&MailboxFactory, &handle, (21u64,), |v: u64| async move {
        Outcome::Completed(v * 2)
    })
    .await?;

    assert_eq!(future.wait().await, Outcome::Completed(42));
    isolate.shutdown();
    Ok(())
}
