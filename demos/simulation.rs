//! End-to-end simulation: four categories of flaky handlers, batched
//! submission, live statistics, and a clean drain.
//!
//! Run with logs:
//! ```sh
//! RUST_LOG=debug cargo run --example simulation
//! ```

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time;
use tokio_util::sync::CancellationToken;

use taskpool::{
    HandlerFn, HandlerRef, Monitor, PoolConfig, PoolStats, RetryPolicy, Task, TaskCategory,
    TaskError, WorkerPool,
};

const TOTAL_TASKS: usize = 20;

/// Builds a handler that sleeps a random amount of work time, then fails
/// with the given message at a rate that may depend on how many retries
/// the task has already been through.
fn simulated(
    work_ms: RangeInclusive<u64>,
    failure_rate: fn(retries: u32) -> u32,
    failure: &'static str,
) -> HandlerRef {
    HandlerFn::arc(move |task: Task, ctx: CancellationToken| {
        let work_ms = work_ms.clone();
        async move {
            let (work, roll) = {
                let mut rng = rand::rng();
                (rng.random_range(work_ms), rng.random_range(0..100u32))
            };
            tokio::select! {
                _ = time::sleep(Duration::from_millis(work)) => {}
                _ = ctx.cancelled() => return Err(TaskError::handler("attempt canceled")),
            }
            if roll < failure_rate(task.attempt_count()) {
                Err(TaskError::handler(failure))
            } else {
                Ok(())
            }
        }
    })
}

fn print_stats(stats: &PoolStats) {
    println!("---- pool statistics ----");
    println!(
        "uptime {:?} | workers {} active / {} idle",
        stats.uptime, stats.active_workers, stats.idle_workers
    );
    println!(
        "tasks: {} total, {} completed, {} failed | queues: {} pending, {} awaiting retry",
        stats.total_tasks,
        stats.completed_tasks,
        stats.failed_tasks,
        stats.queued_tasks,
        stats.retrying_tasks
    );
    println!(
        "latency: min {:.1}ms / avg {:.1}ms / max {:.1}ms",
        stats.min_duration_ms, stats.avg_duration_ms, stats.max_duration_ms
    );
    for (category, slice) in &stats.categories {
        println!(
            "  {category}: {} total, {:.1}% success, {} retried, avg {:.1}ms",
            slice.total,
            slice.success_rate(),
            slice.retried,
            slice.avg_duration_ms
        );
    }
    println!("-------------------------");
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut pool = WorkerPool::new(PoolConfig::default());
    pool.set_task_timeout(Duration::from_secs(1));

    // Email and report failures fade on retry, database clears up after
    // the second attempt, image failures are permanent (and its policy
    // carries no retryable signatures).
    pool.register_handler(
        TaskCategory::Email,
        simulated(
            10..=30,
            |retries| if retries > 0 { 10 } else { 20 },
            "SMTP connect error: delivery refused",
        ),
    );
    pool.register_handler(
        TaskCategory::Image,
        simulated(20..=60, |_| 20, "image format error: unsupported format"),
    );
    pool.register_handler(
        TaskCategory::Database,
        simulated(
            10..=40,
            |retries| if retries > 1 { 3 } else { 10 },
            "database connection error: timed out",
        ),
    );
    pool.register_handler(
        TaskCategory::Report,
        simulated(
            30..=60,
            |retries| if retries > 0 { 8 } else { 15 },
            "data inconsistency error: source rows missing",
        ),
    );

    // Seeded policies use production-scale delays; compress them so the
    // simulation finishes in seconds.
    for (category, initial_ms, max_ms) in [
        (TaskCategory::Email, 20, 600),
        (TaskCategory::Image, 50, 300),
        (TaskCategory::Database, 10, 200),
        (TaskCategory::Report, 100, 1200),
    ] {
        let mut policy = pool.retry_policy(category);
        policy.initial_delay = Duration::from_millis(initial_ms);
        policy.max_delay = Duration::from_millis(max_ms);
        pool.set_retry_policy(category, policy);
    }

    let mut monitor = Monitor::new(pool.gauges()).with_tick(Duration::from_millis(500));
    monitor.start()?;

    pool.start(3)?;
    let pool = Arc::new(pool);

    let producer = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            for batch in 1..=5u64 {
                println!("submitting batch {batch}...");
                for i in 1..=4u64 {
                    let id = (batch - 1) * 4 + i;
                    let category = TaskCategory::ALL[((i - 1) % 4) as usize];
                    let task = Task::new(id, format!("batch{batch}-task{i}"), category);
                    if let Err(err) = pool.add_task(task).await {
                        eprintln!("submission stopped: {err}");
                        return;
                    }
                    time::sleep(Duration::from_millis(50)).await;
                }
                time::sleep(Duration::from_millis(200)).await;
            }
        })
    };

    let mut results = Vec::with_capacity(TOTAL_TASKS);
    while results.len() < TOTAL_TASKS {
        let Some(result) = pool.recv_result().await else {
            break;
        };
        monitor.on_task_result(result.clone());
        results.push(result);
        println!("progress: {}/{TOTAL_TASKS} done", results.len());
        if results.len() % 5 == 0 {
            print_stats(&monitor.stats());
        }
    }
    producer.await?;

    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;
    let recovered = results
        .iter()
        .filter(|r| r.success && r.was_retried())
        .count();
    let total: Duration = results.iter().map(|r| r.total_duration).sum();
    let avg = total / results.len().max(1) as u32;

    println!("\nfinal summary:");
    println!("  tasks:            {}", results.len());
    println!(
        "  succeeded:        {succeeded} ({:.1}%)",
        succeeded as f64 / results.len() as f64 * 100.0
    );
    println!("  failed:           {failed}");
    println!("  retry recoveries: {recovered}");
    println!("  avg turnaround:   {avg:?}");
    print_stats(&monitor.stats());

    let mut pool =
        Arc::try_unwrap(pool).map_err(|_| anyhow::anyhow!("pool handle still shared"))?;
    pool.stop().await;
    monitor.stop().await;
    println!("all work drained, goodbye");
    Ok(())
}
