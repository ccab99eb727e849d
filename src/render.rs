use crate::format::{format_currency, format_date, format_date_time, format_number, format_share, DASH};
use crate::models::{LogEntry, SalesByDate, SalesByPlan};
use chrono_tz::Tz;
use serde_json::Value;

const SALES_CHART_LIMIT: usize = 10;
const DETAIL_LIMIT: usize = 3;

pub fn render_sales_by_date(sales: &[SalesByDate]) -> String {
    if sales.is_empty() {
        return r#"<p class="empty-state">Nenhum dado de vendas encontrado para o período selecionado</p>"#
            .to_string();
    }

    let rows: String = sales
        .iter()
        .take(SALES_CHART_LIMIT)
        .map(|item| {
            format!(
                r#"<div class="chart-row"><span>{date}</span><div><span class="chart-revenue">{revenue}</span><span class="chart-count">({count} vendas)</span></div></div>"#,
                date = escape_html(&format_date(&item.date)),
                revenue = escape_html(&format_currency(item.revenue)),
                count = item.transactions,
            )
        })
        .collect();

    format!(r#"<div class="chart-list">{rows}</div>"#)
}

pub fn render_sales_by_plan(plans: &[SalesByPlan]) -> String {
    if plans.is_empty() {
        return placeholder_row("Nenhuma venda encontrada para o período selecionado");
    }

    let total: f64 = plans.iter().map(|item| item.revenue).sum();
    plans
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{plan}</td><td>{revenue}</td><td>{count}</td><td>{share}</td></tr>",
                plan = escape_html(item.plan.as_deref().unwrap_or("Sem plano")),
                revenue = escape_html(&format_currency(item.revenue)),
                count = format_number(item.transactions),
                share = format_share(item.revenue, total),
            )
        })
        .collect()
}

pub fn render_logs(logs: &[LogEntry], tz: Tz) -> String {
    if logs.is_empty() {
        return placeholder_row("Nenhum log encontrado para o período selecionado");
    }

    logs.iter()
        .map(|log| {
            format!(
                r#"<tr><td><span class="status-badge {class}">{kind}</span></td><td>{message}</td><td>{created}</td><td>{details}</td></tr>"#,
                class = log_status_class(&log.kind),
                kind = escape_html(&log.kind),
                message = escape_html(&log.message),
                created = escape_html(&format_date_time(log.created_at.as_deref(), tz)),
                details = format_log_details(log.details.as_ref()),
            )
        })
        .collect()
}

pub fn log_status_class(kind: &str) -> &'static str {
    match kind.to_lowercase().as_str() {
        "conversão" => "success",
        "error" => "error",
        _ => "info",
    }
}

pub fn format_log_details(details: Option<&Value>) -> String {
    let Some(map) = details.and_then(Value::as_object) else {
        return DASH.to_string();
    };

    let items: Vec<String> = map
        .iter()
        .filter(|(_, value)| !value.is_null())
        .take(DETAIL_LIMIT)
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            format!("{}: {}", escape_html(key), escape_html(&text))
        })
        .collect();

    if items.is_empty() {
        DASH.to_string()
    } else {
        items.join("<br>")
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn placeholder_row(message: &str) -> String {
    format!(r#"<tr><td colspan="4" class="empty-state">{message}</td></tr>"#)
}
