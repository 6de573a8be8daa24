// src/scheduler.rs
//! Periodic and on-demand gather triggers

use crate::gather::Gatherer;
use log::{debug, error, info, warn};
use std::{sync::Arc, time::Duration};
use tokio::{
    runtime::Runtime,
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

/// Run one gather on the blocking pool. Ticks never wait on each other; a
/// tick that lands while a cycle is running is dropped by the gate.
pub fn trigger(gatherer: &Arc<Gatherer>) -> JoinHandle<bool> {
    let gatherer = Arc::clone(gatherer);
    tokio::task::spawn_blocking(move || gatherer.gather())
}

/// Wait for a triggered cycle. A cycle that panicked is logged and reported
/// as `None`.
pub async fn supervise(cycle: JoinHandle<bool>) -> Option<bool> {
    match cycle.await {
        Ok(success) => Some(success),
        Err(e) => {
            error!("Gather cycle did not complete: {}", e);
            None
        }
    }
}

/// Tear down the runtime without waiting past `grace` for blocking work.
///
/// A cycle reading from a receiver that never reports a fix has no end of
/// its own; it is abandoned here rather than joined.
pub fn shutdown(runtime: Runtime, gatherer: &Gatherer, grace: Duration) {
    if gatherer.is_busy() {
        warn!("Abandoning the running gather cycle after {:?}", grace);
    }
    runtime.shutdown_timeout(grace);
}

/// Fire gathers every `period` until `shutdown` turns true, plus one for
/// every message on `on_demand`.
///
/// With `immediate` the first gather starts right away, otherwise after one
/// full period.
pub async fn run(
    gatherer: Arc<Gatherer>,
    period: Duration,
    immediate: bool,
    mut on_demand: mpsc::Receiver<()>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    if !immediate {
        // interval's first tick completes immediately
        ticker.tick().await;
    }

    info!("Gathering every {:?}", period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!("Scheduled gather");
                tokio::spawn(supervise(trigger(&gatherer)));
            }
            Some(()) = on_demand.recv() => {
                info!("On-demand gather requested");
                tokio::spawn(supervise(trigger(&gatherer)));
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::PartialFailurePolicy,
        gather::{
            tests::{RecordingClock, ScriptedTransport, GGA, RMC},
            GatherSettings,
        },
        gps::{nmea::sentence::frame, store::FixStore},
        error::{GpsError, Result},
        transport::{LineReader, Transport},
    };
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        thread,
        time::Instant,
    };

    fn gatherer(transport: ScriptedTransport) -> Arc<Gatherer> {
        gatherer_on(Box::new(transport))
    }

    fn gatherer_on(transport: Box<dyn Transport>) -> Arc<Gatherer> {
        Arc::new(Gatherer::new(
            Arc::new(FixStore::new()),
            transport,
            Box::new(Arc::new(RecordingClock::default())),
            GatherSettings {
                port: "/dev/ttyTEST".to_string(),
                baud_rate: 9600,
                max_hdop: 5.0,
                on_partial_failure: PartialFailurePolicy::Discard,
            },
        ))
    }

    #[tokio::test]
    async fn test_trigger_runs_gather() {
        let gatherer = gatherer(ScriptedTransport::new(&[RMC, GGA]));
        assert!(trigger(&gatherer).await.unwrap());
        assert_eq!(gatherer.store().grid_square(), "RB32id");
    }

    #[tokio::test]
    async fn test_immediate_then_shutdown() {
        let transport = ScriptedTransport::new(&[RMC, GGA]);
        let opened = Arc::clone(&transport.opened);
        let gatherer = gatherer(transport);

        let (_demand_tx, demand_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run(
            Arc::clone(&gatherer),
            Duration::from_secs(3600),
            true,
            demand_rx,
            stop_rx,
        ));

        tokio::time::sleep(Duration::from_millis(200)).await;
        stop_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(gatherer.store().grid_square(), "RB32id");
    }

    #[tokio::test]
    async fn test_deferred_start_and_on_demand() {
        let transport = ScriptedTransport::new(&[RMC, GGA]);
        let opened = Arc::clone(&transport.opened);
        let gatherer = gatherer(transport);

        let (demand_tx, demand_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run(
            Arc::clone(&gatherer),
            Duration::from_secs(3600),
            false,
            demand_rx,
            stop_rx,
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(opened.load(Ordering::SeqCst), 0);

        demand_tx.send(()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(opened.load(Ordering::SeqCst), 1);

        drop(stop_tx);
        handle.await.unwrap();
    }

    /// A receiver without a fix: the same `V` sentence forever, until `stop`.
    struct NoFixTransport {
        stop: Arc<AtomicBool>,
    }

    struct NoFixPort {
        frame: String,
        stop: Arc<AtomicBool>,
    }

    impl Transport for NoFixTransport {
        fn open(&self, _name: &str, _baud_rate: u32) -> Result<Box<dyn LineReader>> {
            Ok(Box::new(NoFixPort {
                frame: frame("GPRMC,203434.00,V,,,,,,,180120,,,N"),
                stop: Arc::clone(&self.stop),
            }))
        }
    }

    impl LineReader for NoFixPort {
        fn read_line(&mut self, _delimiter: u8) -> Result<String> {
            if self.stop.load(Ordering::SeqCst) {
                return Err(GpsError::Transport("port closed".to_string()));
            }
            thread::sleep(Duration::from_millis(1));
            Ok(self.frame.clone())
        }
    }

    struct PanickingTransport;

    impl Transport for PanickingTransport {
        fn open(&self, _name: &str, _baud_rate: u32) -> Result<Box<dyn LineReader>> {
            panic!("receiver driver crashed");
        }
    }

    #[test]
    fn test_shutdown_abandons_cycle_without_fix() {
        let stop = Arc::new(AtomicBool::new(false));
        let gatherer = gatherer_on(Box::new(NoFixTransport {
            stop: Arc::clone(&stop),
        }));
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();

        let _cycle = {
            let _context = runtime.enter();
            trigger(&gatherer)
        };
        let started = Instant::now();
        while !gatherer.is_busy() && started.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(gatherer.is_busy());

        let started = Instant::now();
        shutdown(runtime, &gatherer, Duration::from_millis(100));
        assert!(started.elapsed() < Duration::from_secs(5));
        // the abandoned cycle is still reading
        assert!(gatherer.is_busy());

        stop.store(true, Ordering::SeqCst);
        let started = Instant::now();
        while gatherer.is_busy() && started.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!gatherer.is_busy());
        assert_eq!(gatherer.store().status(), "transport error: port closed");
    }

    #[tokio::test]
    async fn test_supervise_reports_panicked_cycle() {
        let gatherer = gatherer_on(Box::new(PanickingTransport));
        assert_eq!(supervise(trigger(&gatherer)).await, None);
        // the gate guard is released while unwinding
        assert!(!gatherer.is_busy());
    }

    #[tokio::test]
    async fn test_supervise_passes_result_through() {
        let complete = gatherer(ScriptedTransport::new(&[RMC, GGA]));
        assert_eq!(supervise(trigger(&complete)).await, Some(true));

        let cut_short = gatherer(ScriptedTransport::new(&[RMC]));
        assert_eq!(supervise(trigger(&cut_short)).await, Some(false));
    }
}
