use std::sync::Arc;

use scriptdeck_client::ExecutionService;
use tokio_util::sync::CancellationToken;

use crate::catalog::Catalog;
use crate::config::ConsoleConfig;
use crate::launcher::TaskLauncher;
use crate::monitor::TaskMonitor;
use crate::notifications::NotificationSink;
use crate::schedules::ScheduleManager;
use crate::sequence::Sequence;

/// Application state of one control-surface session.
///
/// This is cheaply cloneable (every component is behind an `Arc`). Each
/// component owns its slice of state and exposes its own mutation entry
/// points.
#[derive(Clone)]
pub struct Console {
    pub config: Arc<ConsoleConfig>,
    pub notifications: Arc<NotificationSink>,
    pub catalog: Arc<Catalog>,
    pub sequence: Arc<Sequence>,
    pub launcher: Arc<TaskLauncher>,
    pub monitor: Arc<TaskMonitor>,
    pub schedules: Arc<ScheduleManager>,
    /// Cancelled on teardown; pollers and detail chains hang off it.
    shutdown: CancellationToken,
}

impl Console {
    pub fn new(service: Arc<dyn ExecutionService>, config: ConsoleConfig) -> Self {
        let shutdown = CancellationToken::new();
        let notifications = Arc::new(NotificationSink::new(config.notification_ttl));

        let catalog = Arc::new(Catalog::new(Arc::clone(&service)));
        let sequence = Arc::new(Sequence::new(Arc::clone(&notifications)));
        let monitor = Arc::new(TaskMonitor::new(
            Arc::clone(&service),
            Arc::clone(&notifications),
            config.detail_poll_delay,
            shutdown.clone(),
        ));
        let schedules = Arc::new(ScheduleManager::new(
            Arc::clone(&service),
            Arc::clone(&notifications),
        ));
        let launcher = Arc::new(TaskLauncher::new(
            service,
            Arc::clone(&sequence),
            Arc::clone(&monitor),
            Arc::clone(&schedules),
            Arc::clone(&notifications),
        ));

        Self {
            config: Arc::new(config),
            notifications,
            catalog,
            sequence,
            launcher,
            monitor,
            schedules,
            shutdown,
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancel the pollers and the detail chain, then wait for the chain.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.monitor.join_detail_chain().await;
    }
}
