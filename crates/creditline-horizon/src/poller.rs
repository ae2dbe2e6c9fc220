use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::{HorizonConfig, StartLedger};
use crate::error::HorizonError;
use crate::event::HorizonEvent;
use crate::source::EventSource;

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &str;
    async fn handle(&self, event: &HorizonEvent) -> anyhow::Result<()>;
}

/// Writes every event to the log.
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    fn name(&self) -> &str {
        "log"
    }

    async fn handle(&self, event: &HorizonEvent) -> anyhow::Result<()> {
        info!(
            event_id = %event.id,
            ledger = event.ledger,
            contract_id = %event.contract_id,
            "horizon event received"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub fetched: usize,
    pub dispatched: usize,
    pub handler_failures: usize,
    pub cursor: Option<u64>,
}

pub struct HorizonPoller {
    config: HorizonConfig,
    source: Arc<dyn EventSource>,
    handlers: Vec<Arc<dyn EventHandler>>,
    cursor: Option<u64>,
}

impl HorizonPoller {
    pub fn new(config: HorizonConfig, source: Arc<dyn EventSource>) -> Self {
        let cursor = match config.start_ledger {
            StartLedger::Latest => None,
            StartLedger::Sequence(ledger) => Some(ledger.saturating_sub(1)),
        };

        Self {
            config,
            source,
            handlers: Vec::new(),
            cursor,
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Fetches once and hands every new event to every handler. A failing
    /// handler is logged and counted; it does not stop the others.
    pub async fn poll_once(&mut self) -> Result<PollReport, HorizonError> {
        let mut events = self
            .source
            .fetch(self.cursor, &self.config.contract_ids)
            .await?;
        events.sort_by_key(|event| event.ledger);

        let mut report = PollReport {
            fetched: events.len(),
            ..PollReport::default()
        };

        let floor = self.cursor;
        for event in events {
            if floor.is_some_and(|cursor| event.ledger <= cursor) {
                continue;
            }

            let outcomes = join_all(self.handlers.iter().map(|handler| {
                let event = &event;
                async move { (handler.name(), handler.handle(event).await) }
            }))
            .await;

            for (handler, outcome) in outcomes {
                if let Err(err) = outcome {
                    report.handler_failures += 1;
                    warn!(
                        handler = handler,
                        event_id = %event.id,
                        ledger = event.ledger,
                        "horizon event handler failed: {err:#}"
                    );
                }
            }

            report.dispatched += 1;
            self.cursor = Some(event.ledger);
        }

        report.cursor = self.cursor;
        Ok(report)
    }

    /// Polls on the configured interval until `shutdown` turns true or its
    /// sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            horizon_url = %self.config.horizon_url,
            contracts = self.config.contract_ids.len(),
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "horizon poller started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.poll_once().await {
                        error!("horizon poll failed: {err}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(cursor = ?self.cursor, "horizon poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    struct ScriptedSource {
        batches: Mutex<Vec<Vec<HorizonEvent>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(batches: Vec<Vec<HorizonEvent>>) -> Self {
            Self {
                batches: Mutex::new(batches),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        async fn fetch(
            &self,
            _cursor: Option<u64>,
            _contract_ids: &[String],
        ) -> Result<Vec<HorizonEvent>, HorizonError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut batches = self.batches.lock().unwrap();
            if batches.is_empty() {
                return Ok(Vec::new());
            }
            Ok(batches.remove(0))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl EventSource for FailingSource {
        async fn fetch(
            &self,
            _cursor: Option<u64>,
            _contract_ids: &[String],
        ) -> Result<Vec<HorizonEvent>, HorizonError> {
            Err(HorizonError::Source("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn handle(&self, event: &HorizonEvent) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(event.id.clone());
            Ok(())
        }
    }

    struct Exploding;

    #[async_trait]
    impl EventHandler for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        async fn handle(&self, _event: &HorizonEvent) -> anyhow::Result<()> {
            anyhow::bail!("handler blew up")
        }
    }

    fn event(id: &str, ledger: u64) -> HorizonEvent {
        HorizonEvent {
            id: id.to_string(),
            ledger,
            contract_id: "CCREDIT".to_string(),
            topics: vec!["draw".to_string()],
            payload: json!({ "amount": "10" }),
        }
    }

    fn config(start_ledger: StartLedger) -> HorizonConfig {
        HorizonConfig {
            enabled: true,
            horizon_url: "http://horizon.test".to_string(),
            contract_ids: vec!["CCREDIT".to_string()],
            poll_interval: Duration::from_millis(10),
            start_ledger,
        }
    }

    #[tokio::test]
    async fn failing_handler_does_not_block_others() {
        let source = Arc::new(ScriptedSource::new(vec![vec![event("e1", 5), event("e2", 6)]]));
        let recorder = Arc::new(Recorder::default());
        let mut poller = HorizonPoller::new(config(StartLedger::Latest), source)
            .with_handler(Arc::new(Exploding))
            .with_handler(recorder.clone());

        let report = poller.poll_once().await.unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(report.dispatched, 2);
        assert_eq!(report.handler_failures, 2);
        assert_eq!(report.cursor, Some(6));
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn skips_events_at_or_below_cursor() {
        let source = Arc::new(ScriptedSource::new(vec![
            vec![event("e1", 10)],
            vec![event("e1", 10), event("e3", 12)],
        ]));
        let recorder = Arc::new(Recorder::default());
        let mut poller = HorizonPoller::new(config(StartLedger::Latest), source)
            .with_handler(recorder.clone());

        poller.poll_once().await.unwrap();
        let second = poller.poll_once().await.unwrap();

        assert_eq!(second.fetched, 2);
        assert_eq!(second.dispatched, 1);
        assert_eq!(poller.cursor(), Some(12));
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["e1", "e3"]);
    }

    #[tokio::test]
    async fn events_sharing_a_ledger_are_all_dispatched() {
        let source = Arc::new(ScriptedSource::new(vec![vec![
            event("e2", 7),
            event("e1", 7),
            event("e0", 6),
        ]]));
        let recorder = Arc::new(Recorder::default());
        let mut poller = HorizonPoller::new(config(StartLedger::Latest), source)
            .with_handler(recorder.clone());

        let report = poller.poll_once().await.unwrap();

        assert_eq!(report.dispatched, 3);
        assert_eq!(report.cursor, Some(7));
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["e0", "e2", "e1"]);
    }

    #[tokio::test]
    async fn start_ledger_is_inclusive() {
        let source = Arc::new(ScriptedSource::new(vec![vec![
            event("old", 99),
            event("first", 100),
        ]]));
        let recorder = Arc::new(Recorder::default());
        let mut poller = HorizonPoller::new(config(StartLedger::Sequence(100)), source)
            .with_handler(recorder.clone());

        poller.poll_once().await.unwrap();

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["first"]);
    }

    #[tokio::test]
    async fn simulated_source_yields_nothing() {
        let source = Arc::new(crate::source::SimulatedEventSource::new("http://horizon.test"));
        let mut poller = HorizonPoller::new(config(StartLedger::Latest), source)
            .with_handler(Arc::new(LoggingEventHandler));

        let report = poller.poll_once().await.unwrap();

        assert_eq!(report, PollReport::default());
    }

    #[tokio::test]
    async fn source_errors_surface_from_poll_once() {
        let mut poller = HorizonPoller::new(config(StartLedger::Latest), Arc::new(FailingSource));
        assert!(matches!(
            poller.poll_once().await,
            Err(HorizonError::Source(_))
        ));
    }

    #[tokio::test]
    async fn run_keeps_polling_until_shutdown() {
        let source = Arc::new(ScriptedSource::new(Vec::new()));
        let poller = HorizonPoller::new(config(StartLedger::Latest), source.clone());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(poller.run(rx));
        tokio::time::sleep(Duration::from_millis(60)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller did not stop")
            .unwrap();
        assert!(source.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn run_survives_source_errors() {
        let poller = HorizonPoller::new(config(StartLedger::Latest), Arc::new(FailingSource));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(poller.run(rx));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!handle.is_finished());

        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller did not stop")
            .unwrap();
    }
}
