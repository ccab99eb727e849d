use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub struct AutoRefresh {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn start<F, Fut>(&mut self, job: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();
        let period = self.period;
        info!(period_secs = period.as_secs(), "auto-refresh started");
        self.handle = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                debug!("auto-refresh tick");
                job().await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("auto-refresh stopped");
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn counting_job(counter: Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + 'static {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_once_per_period_after_start() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut refresh = AutoRefresh::new(Duration::from_secs(300));
        refresh.start(counting_job(Arc::clone(&counter)));
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(300)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(300)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(refresh.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_future_runs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut refresh = AutoRefresh::new(Duration::from_secs(60));
        refresh.start(counting_job(Arc::clone(&counter)));
        settle().await;
        refresh.stop();
        assert!(!refresh.is_running());

        tokio::time::advance(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_job() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut refresh = AutoRefresh::new(Duration::from_secs(60));
        refresh.start(counting_job(Arc::clone(&first)));
        refresh.start(counting_job(Arc::clone(&second)));
        settle().await;

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
