use blocking_queue_mini::{BoundedBlockingQueue, QueueConfig, QueueError, append_snapshots};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PRODUCERS: usize = 10;
const CONSUMERS: usize = 5;
const ITEMS_PER_PRODUCER: u64 = 1000;
const ATTEMPT_TIMEOUT: Duration = Duration::from_millis(5);

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).init();

    let config = QueueConfig::new("demo", 10);
    let queue = match BoundedBlockingQueue::<u64>::from_config(&config) {
        Ok(queue) => Arc::new(queue),
        Err(err) => {
            warn!(error = %err, "invalid queue config");
            return;
        }
    };

    // Producers retry on backpressure until every value is in.
    let mut producers = vec![];
    for _ in 0..PRODUCERS {
        let queue = Arc::clone(&queue);
        producers.push(thread::spawn(move || {
            for value in 0..ITEMS_PER_PRODUCER {
                let mut pending = value;
                loop {
                    match queue.insert_timeout(pending, ATTEMPT_TIMEOUT) {
                        Ok(()) => break,
                        Err(err) if err.kind().is_retryable() => pending = err.into_inner(),
                        Err(err) => {
                            warn!(error = %err, "producer stopped early");
                            return;
                        }
                    }
                }
            }
        }));
    }

    // Consumers drain until the queue is closed and empty.
    let mut consumers = vec![];
    for _ in 0..CONSUMERS {
        let queue = Arc::clone(&queue);
        consumers.push(thread::spawn(move || {
            let mut sum = 0u64;
            loop {
                match queue.remove_timeout(ATTEMPT_TIMEOUT) {
                    Ok(value) => sum += value,
                    Err(QueueError::Closed) => return sum,
                    Err(_) => continue,
                }
            }
        }));
    }

    for handle in producers {
        handle.join().unwrap();
    }
    queue.close();

    let total: u64 = consumers.into_iter().map(|handle| handle.join().unwrap()).sum();
    let expected = PRODUCERS as u64 * (0..ITEMS_PER_PRODUCER).sum::<u64>();
    let drained_everything = total == expected;
    if drained_everything {
        info!(total, expected, "drained queue");
    } else {
        warn!(total, expected, "drained sum does not match what was produced");
    }

    let snapshot = queue.stats();
    info!(
        inserted = snapshot.inserted,
        removed = snapshot.removed,
        full_timeouts = snapshot.full_timeouts,
        empty_timeouts = snapshot.empty_timeouts,
        "queue stats"
    );
    append_snapshots(&[snapshot], "queue-stats.ndjson").expect("Failed to append stats");

    if !drained_everything {
        process::exit(1);
    }
}
