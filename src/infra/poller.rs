//! Fixed-interval refresh loop with explicit cancellation.
//!
//! Each tick is awaited before the next sleep starts, so ticks never overlap.
//! The loop stops when the shutdown flag flips to `true` or every sender is
//! dropped; dropping the future itself also cancels it. Pausing and resuming
//! is done by flipping the flag and starting a new loop from a fresh receiver.

use std::{future::Future, time::Duration};

use tokio::{sync::watch, time::sleep};

/// Default refresh cadence for the active bids list.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Runs `tick` immediately and then once per `interval` until shut down.
/// Returns the number of completed ticks.
pub async fn run_polling<F, Fut>(
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) -> u64
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut completed = 0_u64;
    loop {
        if *shutdown.borrow() {
            break;
        }
        tick(completed).await;
        completed += 1;

        tokio::select! {
            _ = sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::debug!(ticks = completed, "polling stopped");
    completed
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(run_polling(Duration::from_secs(60), receiver, move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        shutdown.send_replace(true);
        let completed = task.await.expect("poll task");
        assert_eq!(completed, 3);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tick_delays_next_one_instead_of_overlapping() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let (in_flight_tick, max_tick) = (in_flight.clone(), max_seen.clone());
        let (_shutdown, receiver) = watch::channel(false);

        let task = tokio::spawn(run_polling(Duration::from_secs(10), receiver, move |_| {
            let in_flight = in_flight_tick.clone();
            let max_seen = max_tick.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_secs(25)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        }));

        tokio::time::sleep(Duration::from_secs(200)).await;
        task.abort();
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resuming_starts_a_fresh_loop_on_the_same_sender() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let (shutdown, _) = watch::channel(false);
        let counting = |ticks: Arc<AtomicUsize>| {
            move |_: u64| {
                let ticks = ticks.clone();
                async move {
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            }
        };

        let first = tokio::spawn(run_polling(
            Duration::from_secs(30),
            shutdown.subscribe(),
            counting(ticks.clone()),
        ));
        tokio::time::sleep(Duration::from_secs(45)).await;
        shutdown.send_replace(true);
        assert_eq!(first.await.expect("first loop"), 2);

        shutdown.send_replace(false);
        let second = tokio::spawn(run_polling(
            Duration::from_secs(30),
            shutdown.subscribe(),
            counting(ticks.clone()),
        ));
        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown.send_replace(true);
        assert_eq!(second.await.expect("second loop"), 1);
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_every_sender_ends_the_loop() {
        let (sender, receiver) = watch::channel(false);
        let task = tokio::spawn(run_polling(Duration::from_secs(5), receiver, |_| async {}));
        tokio::time::sleep(Duration::from_secs(12)).await;
        drop(sender);
        let completed = task.await.expect("poll task");
        assert_eq!(completed, 3);
    }
}
