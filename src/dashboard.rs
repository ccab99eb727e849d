use crate::api::ApiClient;
use crate::config::Config;
use crate::format::{format_currency, format_instant, format_number, format_rate, format_share, iso_date};
use crate::models::{
    FilterState, HealthResponse, LogEntry, LogsResponse, OverviewMetrics, SalesMetrics, Tab,
};
use crate::render::{render_logs, render_sales_by_date, render_sales_by_plan};
use crate::refresh::AutoRefresh;
use crate::view::{LoadGuard, View, ViewSnapshot};
use chrono::{Duration as DateDuration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered,
    Stale,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    Degraded(String),
    Unreachable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub tab: Tab,
    pub seq: u64,
}

/// Per-tab request counters. Only the newest ticket of a tab may commit.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: [AtomicU64; 3],
}

impl RequestSequencer {
    pub fn issue(&self, tab: Tab) -> Ticket {
        let seq = self.latest[tab.index()].fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { tab, seq }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest[ticket.tab.index()].load(Ordering::SeqCst) == ticket.seq
    }
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    banner_timeout: Duration,
    log_limit: u32,
    timezone: Tz,
}

struct PendingLoad {
    ticket: Ticket,
    filters: FilterState,
    _guard: LoadGuard,
}

#[derive(Clone)]
pub struct Dashboard {
    api: ApiClient,
    view: Arc<Mutex<View>>,
    sequences: Arc<RequestSequencer>,
    settings: Settings,
}

impl Dashboard {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            view: Arc::new(Mutex::new(View::default())),
            sequences: Arc::new(RequestSequencer::default()),
            settings: Settings {
                banner_timeout: config.banner_timeout,
                log_limit: config.log_limit,
                timezone: config.timezone,
            },
        }
    }

    pub async fn initialize(&self, today: NaiveDate) -> LoadOutcome {
        info!("initializing dashboard");
        self.set_default_dates(today).await;
        let outcome = self.load_active().await;
        info!(?outcome, "dashboard initialized");
        outcome
    }

    pub async fn set_default_dates(&self, today: NaiveDate) {
        let week_ago = today - DateDuration::days(7);
        self.set_filters(FilterState::new(Some(iso_date(week_ago)), Some(iso_date(today))))
            .await;
    }

    pub async fn set_filters(&self, filters: FilterState) {
        self.view.lock().await.filters = filters.normalized();
    }

    pub async fn filters(&self) -> FilterState {
        self.view.lock().await.filters.clone()
    }

    pub async fn active_tab(&self) -> Tab {
        self.view.lock().await.active_tab
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        self.view.lock().await.snapshot()
    }

    pub async fn switch_tab(&self, tab: Tab) -> LoadOutcome {
        info!(%tab, "switching tab");
        self.view.lock().await.active_tab = tab;
        self.load_tab(tab).await
    }

    pub async fn apply_filters(&self, filters: FilterState) -> LoadOutcome {
        self.set_filters(filters).await;
        self.load_active().await
    }

    pub async fn load_active(&self) -> LoadOutcome {
        let tab = self.active_tab().await;
        self.load_tab(tab).await
    }

    pub async fn load_tab(&self, tab: Tab) -> LoadOutcome {
        let outcome = match tab {
            Tab::Overview => self.load_overview().await,
            Tab::Sales => self.load_sales().await,
            Tab::Logs => self.load_logs().await,
        };
        info!(%tab, ?outcome, "load finished");
        outcome
    }

    pub async fn load_overview(&self) -> LoadOutcome {
        let load = self.begin(Tab::Overview).await;
        let data: Option<OverviewMetrics> = self
            .fetch(Tab::Overview.endpoint(), &load.filters.query_params())
            .await;
        self.commit(load, data.map(|metrics| move |view: &mut View| apply_overview(view, &metrics)))
            .await
    }

    pub async fn load_sales(&self) -> LoadOutcome {
        let load = self.begin(Tab::Sales).await;
        let data: Option<SalesMetrics> = self
            .fetch(Tab::Sales.endpoint(), &load.filters.query_params())
            .await;
        self.commit(load, data.map(|sales| move |view: &mut View| apply_sales(view, &sales)))
            .await
    }

    pub async fn load_logs(&self) -> LoadOutcome {
        let load = self.begin(Tab::Logs).await;
        let mut params = load.filters.query_params();
        params.push(("limit", Some(self.settings.log_limit.to_string())));
        let data: Option<LogsResponse> = self.fetch(Tab::Logs.endpoint(), &params).await;
        let tz = self.settings.timezone;
        self.commit(
            load,
            data.map(|response| {
                move |view: &mut View| {
                    // A body without `logs` leaves the previous table in place.
                    if let Some(logs) = response.logs {
                        apply_logs(view, &logs, tz);
                    }
                }
            }),
        )
        .await
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, Option<String>)],
    ) -> Option<T> {
        match self.api.get_json(endpoint, params).await {
            Ok(data) => Some(data),
            Err(err) => {
                error!(endpoint, error = %err, "api request failed");
                self.show_error(format!("Erro ao carregar dados: {err}")).await;
                None
            }
        }
    }

    pub async fn show_error(&self, message: impl Into<String>) -> u64 {
        let id = self.view.lock().await.push_banner(message);
        let view = Arc::clone(&self.view);
        let timeout = self.settings.banner_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            view.lock().await.remove_banner(id);
        });
        id
    }

    pub fn auto_refresh(&self, period: Duration) -> AutoRefresh {
        let mut refresh = AutoRefresh::new(period);
        let dashboard = self.clone();
        refresh.start(move || {
            let dashboard = dashboard.clone();
            async move {
                dashboard.load_active().await;
            }
        });
        refresh
    }

    pub async fn check_health(&self) -> HealthStatus {
        match self.api.get_json::<HealthResponse>("/health", &[]).await {
            Ok(health) if health.status == "ok" => {
                info!("api health check ok");
                HealthStatus::Ok
            }
            Ok(health) => {
                warn!(status = %health.status, "api health check degraded");
                HealthStatus::Degraded(health.status)
            }
            Err(err) => {
                error!(error = %err, "api health check failed");
                HealthStatus::Unreachable(err.to_string())
            }
        }
    }

    async fn begin(&self, tab: Tab) -> PendingLoad {
        let ticket = self.sequences.issue(tab);
        let view = self.view.lock().await;
        let guard = view.begin_load();
        debug!(%tab, seq = ticket.seq, "load started");
        PendingLoad {
            ticket,
            filters: view.filters.clone(),
            _guard: guard,
        }
    }

    async fn commit<F>(&self, load: PendingLoad, apply: Option<F>) -> LoadOutcome
    where
        F: FnOnce(&mut View),
    {
        let mut view = self.view.lock().await;
        let ticket = load.ticket;
        drop(load);
        let Some(apply) = apply else {
            return LoadOutcome::Failed;
        };
        if !self.sequences.is_current(ticket) {
            debug!(tab = %ticket.tab, seq = ticket.seq, "discarding stale result");
            return LoadOutcome::Stale;
        }
        apply(&mut view);
        view.set_text("last-update", format_instant(Utc::now(), self.settings.timezone));
        LoadOutcome::Rendered
    }
}

pub fn apply_overview(view: &mut View, data: &OverviewMetrics) {
    let counters = [
        ("presell-entries", data.presell_entries),
        ("bot-starts", data.bot_starts),
        ("pix-generated", data.pix_generated),
        ("pix-paid", data.pix_paid),
        ("step-1", data.step_1_welcome),
        ("step-2", data.step_2_preview),
        ("step-3", data.step_3_gallery),
        ("step-4", data.step_4_vip_plans),
        ("step-5", data.step_5_payment),
        ("blocked-users", data.blocked_users),
        ("joined-group", data.joined_group),
        ("left-group", data.left_group),
        ("conversions", data.conversions),
    ];
    for (slot, value) in counters {
        view.set_text(slot, format_number(value));
    }

    view.set_text("quick-conversion", quick_conversion(data));
    view.set_text("quick-users", format_number(data.bot_starts));
}

pub fn quick_conversion(data: &OverviewMetrics) -> String {
    format_share(data.pix_paid as f64, data.pix_generated as f64)
}

pub fn apply_sales(view: &mut View, data: &SalesMetrics) {
    view.set_text("total-revenue", format_currency(data.total_revenue));
    view.set_text("total-transactions", format_number(data.total_transactions));
    view.set_text("conversion-rate", format_rate(data.conversion_rate));
    view.set_text("average-ticket", format_currency(data.average_ticket));
    view.set_text("quick-revenue", format_currency(data.total_revenue));

    view.set_html("sales-chart-data", render_sales_by_date(&data.sales_by_date));
    view.set_html("sales-by-plan", render_sales_by_plan(&data.sales_by_plan));
}

pub fn apply_logs(view: &mut View, logs: &[LogEntry], tz: Tz) {
    view.set_html("logs-data", render_logs(logs, tz));
}
