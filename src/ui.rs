use crate::models::Tab;
use crate::render::escape_html;
use crate::view::{Banner, SlotValue, ViewSnapshot};

pub fn render_index(snapshot: &ViewSnapshot) -> String {
    let (refresh_class, refresh_disabled) = if snapshot.loading {
        ("loading", "disabled")
    } else {
        ("", "")
    };

    fill_template(INDEX_HTML, |key| {
        if let Some(name) = key.strip_prefix("TAB:") {
            let tab = name.parse::<Tab>().ok()?;
            return Some(if tab == snapshot.active_tab { "active" } else { "" }.to_string());
        }
        let value = match key {
            "START_DATE" => escape_html(snapshot.filters.start_date.as_deref().unwrap_or_default()),
            "END_DATE" => escape_html(snapshot.filters.end_date.as_deref().unwrap_or_default()),
            "REFRESH_CLASS" => refresh_class.to_string(),
            "REFRESH_DISABLED" => refresh_disabled.to_string(),
            "BANNERS" => render_banners(&snapshot.banners),
            slot => match snapshot.slots.get(slot)? {
                SlotValue::Text(text) => escape_html(text),
                SlotValue::Html(html) => html.clone(),
            },
        };
        Some(value)
    })
}

/// Single pass over `{{KEY}}` markers, so substituted content is never rescanned.
/// Unknown keys are left in place.
fn fill_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub fn render_banners(banners: &[Banner]) -> String {
    banners
        .iter()
        .map(|banner| {
            format!(
                r#"<div class="error" data-banner="{id}"><strong>Erro:</strong> {message}<br><small>Verifique a conexão com a API e tente novamente.</small></div>"#,
                id = banner.id,
                message = escape_html(&banner.message),
            )
        })
        .collect()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Bot Analytics</title>
  <style>
    :root {
      --bg: #0f0f23;
      --panel: rgba(30, 30, 60, 0.7);
      --row: rgba(45, 45, 90, 0.3);
      --ink: #e2e8f0;
      --muted: #94a3b8;
      --soft: #cbd5e1;
      --accent: #8b5cf6;
      --ok: #10b981;
      --info: #3b82f6;
      --bad: #ef4444;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg), #1a1a3e 60%, #0f0f23);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    .header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      padding: 20px 32px;
      border-bottom: 1px solid rgba(139, 92, 246, 0.2);
    }

    .header h1 {
      margin: 0;
      font-size: 1.5rem;
    }

    .quick-stats {
      display: flex;
      gap: 24px;
    }

    .quick-stats .label {
      display: block;
      font-size: 0.75rem;
      color: var(--muted);
      text-transform: uppercase;
    }

    .quick-stats .value {
      font-size: 1.2rem;
      font-weight: 600;
    }

    .container {
      width: min(1200px, 100%);
      margin: 0 auto;
      padding: 24px 32px 48px;
      display: grid;
      gap: 24px;
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: end;
    }

    .controls label {
      display: grid;
      gap: 4px;
      font-size: 0.8rem;
      color: var(--muted);
    }

    input[type="date"] {
      background: var(--panel);
      color: var(--ink);
      border: 1px solid rgba(139, 92, 246, 0.3);
      border-radius: 8px;
      padding: 8px 10px;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 8px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button:disabled,
    .refresh-btn.loading {
      opacity: 0.6;
      cursor: progress;
    }

    .tabs {
      display: flex;
      gap: 8px;
    }

    .tabs form {
      margin: 0;
    }

    .tab-button {
      background: transparent;
      color: var(--muted);
      border: 1px solid rgba(139, 92, 246, 0.3);
    }

    .tab-button.active {
      background: var(--accent);
      color: white;
    }

    .tab-content {
      display: none;
      gap: 24px;
    }

    .tab-content.active {
      display: grid;
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .card {
      background: var(--panel);
      border: 1px solid rgba(139, 92, 246, 0.2);
      border-radius: 12px;
      padding: 18px;
      display: grid;
      gap: 6px;
    }

    .card .label {
      font-size: 0.8rem;
      color: var(--muted);
      text-transform: uppercase;
      letter-spacing: 0.08em;
    }

    .card .value {
      font-size: 1.6rem;
      font-weight: 700;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: var(--panel);
      border-radius: 12px;
      overflow: hidden;
    }

    th,
    td {
      text-align: left;
      padding: 12px 14px;
      border-bottom: 1px solid rgba(139, 92, 246, 0.1);
    }

    th {
      color: var(--muted);
      font-size: 0.8rem;
      text-transform: uppercase;
    }

    .empty-state {
      text-align: center;
      color: var(--muted);
      padding: 2rem;
    }

    .chart-list {
      display: grid;
      gap: 0.5rem;
      margin-top: 1rem;
      font-size: 0.875rem;
      color: var(--soft);
    }

    .chart-row {
      display: flex;
      justify-content: space-between;
      padding: 0.5rem;
      background: var(--row);
      border-radius: 4px;
    }

    .chart-revenue {
      color: var(--ok);
    }

    .chart-count {
      color: var(--muted);
      margin-left: 0.5rem;
    }

    .status-badge {
      display: inline-block;
      padding: 2px 10px;
      border-radius: 999px;
      font-size: 0.75rem;
      font-weight: 600;
    }

    .status-badge.success {
      background: rgba(16, 185, 129, 0.2);
      color: var(--ok);
    }

    .status-badge.info {
      background: rgba(59, 130, 246, 0.2);
      color: var(--info);
    }

    .status-badge.error {
      background: rgba(239, 68, 68, 0.2);
      color: var(--bad);
    }

    .error {
      background: rgba(239, 68, 68, 0.15);
      border: 1px solid rgba(239, 68, 68, 0.4);
      color: #fecaca;
      border-radius: 8px;
      padding: 12px 16px;
    }

    .updated {
      color: var(--muted);
      font-size: 0.8rem;
    }
  </style>
</head>
<body>
  <header class="header">
    <h1>Bot Analytics</h1>
    <div class="quick-stats">
      <div><span class="label">Usuários</span><span class="value" id="quick-users">{{quick-users}}</span></div>
      <div><span class="label">Conversão</span><span class="value" id="quick-conversion">{{quick-conversion}}</span></div>
      <div><span class="label">Receita</span><span class="value" id="quick-revenue">{{quick-revenue}}</span></div>
    </div>
  </header>

  <main class="main">
    <div class="container">
      <div id="banners">{{BANNERS}}</div>

      <section class="controls">
        <form id="filters-form" class="controls" method="post" action="/filters">
          <label>Início<input type="date" id="startDate" name="start_date" value="{{START_DATE}}" /></label>
          <label>Fim<input type="date" id="endDate" name="end_date" value="{{END_DATE}}" /></label>
          <button type="submit">Aplicar filtros</button>
        </form>
        <form id="refresh-form" method="post" action="/refresh">
          <button type="submit" class="refresh-btn {{REFRESH_CLASS}}" {{REFRESH_DISABLED}}>Atualizar</button>
        </form>
        <span class="updated">Atualizado em <span id="last-update">{{last-update}}</span></span>
      </section>

      <nav class="tabs">
        <form method="post" action="/tab/overview" data-tab="overview"><button type="submit" class="tab-button {{TAB:overview}}">Visão geral</button></form>
        <form method="post" action="/tab/sales" data-tab="sales"><button type="submit" class="tab-button {{TAB:sales}}">Vendas</button></form>
        <form method="post" action="/tab/logs" data-tab="logs"><button type="submit" class="tab-button {{TAB:logs}}">Logs</button></form>
      </nav>

      <section id="overview-tab" class="tab-content {{TAB:overview}}">
        <div class="cards">
          <div class="card"><span class="label">Entradas na presell</span><span class="value" id="presell-entries">{{presell-entries}}</span></div>
          <div class="card"><span class="label">/start no bot</span><span class="value" id="bot-starts">{{bot-starts}}</span></div>
          <div class="card"><span class="label">PIX gerados</span><span class="value" id="pix-generated">{{pix-generated}}</span></div>
          <div class="card"><span class="label">PIX pagos</span><span class="value" id="pix-paid">{{pix-paid}}</span></div>
        </div>
        <div class="cards">
          <div class="card"><span class="label">1. Boas-vindas</span><span class="value" id="step-1">{{step-1}}</span></div>
          <div class="card"><span class="label">2. Prévia</span><span class="value" id="step-2">{{step-2}}</span></div>
          <div class="card"><span class="label">3. Galeria</span><span class="value" id="step-3">{{step-3}}</span></div>
          <div class="card"><span class="label">4. Planos VIP</span><span class="value" id="step-4">{{step-4}}</span></div>
          <div class="card"><span class="label">5. Pagamento</span><span class="value" id="step-5">{{step-5}}</span></div>
        </div>
        <div class="cards">
          <div class="card"><span class="label">Bloquearam o bot</span><span class="value" id="blocked-users">{{blocked-users}}</span></div>
          <div class="card"><span class="label">Entraram no grupo</span><span class="value" id="joined-group">{{joined-group}}</span></div>
          <div class="card"><span class="label">Saíram do grupo</span><span class="value" id="left-group">{{left-group}}</span></div>
          <div class="card"><span class="label">Conversões</span><span class="value" id="conversions">{{conversions}}</span></div>
        </div>
      </section>

      <section id="sales-tab" class="tab-content {{TAB:sales}}">
        <div class="cards">
          <div class="card"><span class="label">Receita total</span><span class="value" id="total-revenue">{{total-revenue}}</span></div>
          <div class="card"><span class="label">Transações</span><span class="value" id="total-transactions">{{total-transactions}}</span></div>
          <div class="card"><span class="label">Taxa de conversão</span><span class="value" id="conversion-rate">{{conversion-rate}}</span></div>
          <div class="card"><span class="label">Ticket médio</span><span class="value" id="average-ticket">{{average-ticket}}</span></div>
        </div>
        <div class="card">
          <span class="label">Vendas por data</span>
          <div id="sales-chart-data">{{sales-chart-data}}</div>
        </div>
        <table>
          <thead><tr><th>Plano</th><th>Receita</th><th>Vendas</th><th>Participação</th></tr></thead>
          <tbody id="sales-by-plan">{{sales-by-plan}}</tbody>
        </table>
      </section>

      <section id="logs-tab" class="tab-content {{TAB:logs}}">
        <table>
          <thead><tr><th>Tipo</th><th>Mensagem</th><th>Data</th><th>Detalhes</th></tr></thead>
          <tbody id="logs-data">{{logs-data}}</tbody>
        </table>
      </section>
    </div>
  </main>

  <script>
    const banners = document.getElementById('banners');
    const refreshBtn = document.querySelector('.refresh-btn');
    const startInput = document.getElementById('startDate');
    const endInput = document.getElementById('endDate');

    const escapeHtml = (text) =>
      text.replace(/[&<>"']/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[c]);

    const applySnapshot = (snap) => {
      Object.entries(snap.slots).forEach(([id, slot]) => {
        const el = document.getElementById(id);
        if (!el) {
          console.warn(`missing element: ${id}`);
          return;
        }
        if (slot.kind === 'html') {
          el.innerHTML = slot.value;
        } else {
          el.textContent = slot.value;
        }
      });

      document.querySelectorAll('[data-tab]').forEach((form) => {
        const active = form.dataset.tab === snap.active_tab;
        form.querySelector('.tab-button').classList.toggle('active', active);
        document.getElementById(`${form.dataset.tab}-tab`).classList.toggle('active', active);
      });

      banners.innerHTML = snap.banners
        .map((b) => `<div class="error" data-banner="${b.id}"><strong>Erro:</strong> ${escapeHtml(b.message)}<br><small>Verifique a conexão com a API e tente novamente.</small></div>`)
        .join('');

      refreshBtn.classList.toggle('loading', snap.loading);
      refreshBtn.disabled = snap.loading;
      startInput.value = snap.filters.start_date || '';
      endInput.value = snap.filters.end_date || '';
    };

    const post = async (path, body) => {
      refreshBtn.classList.add('loading');
      refreshBtn.disabled = true;
      const res = await fetch(path, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: body ? JSON.stringify(body) : undefined
      });
      if (res.ok) {
        applySnapshot(await res.json());
      }
    };

    document.querySelectorAll('[data-tab]').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        post(`/api/tab/${form.dataset.tab}`).catch(console.error);
      });
    });

    document.getElementById('filters-form').addEventListener('submit', (event) => {
      event.preventDefault();
      post('/api/filters', { start_date: startInput.value, end_date: endInput.value }).catch(console.error);
    });

    document.getElementById('refresh-form').addEventListener('submit', (event) => {
      event.preventDefault();
      post('/api/refresh').catch(console.error);
    });

    setInterval(() => {
      fetch('/api/view')
        .then((res) => (res.ok ? res.json() : null))
        .then((snap) => snap && applySnapshot(snap))
        .catch(console.error);
    }, 5000);
  </script>
</body>
</html>
"#;
