use crate::models::{AggregationResult, BreakdownRow, ProviderVolume, ShowRate};
use crate::range::DateRange;

pub fn render_dashboard(
    range: &DateRange,
    metrics: &AggregationResult,
    providers: &[ProviderVolume],
    show_rate: &ShowRate,
) -> String {
    INDEX_HTML
        .replace("{{START}}", &range.start.to_string())
        .replace("{{END}}", &range.end.to_string())
        .replace("{{SENT}}", &metrics.total_sent.to_string())
        .replace("{{BOOKED}}", &metrics.total_booked.to_string())
        .replace("{{PERCENT}}", &format!("{:.1}", metrics.percent_booked))
        .replace("{{REVENUE}}", &format_money(metrics.estimated_revenue))
        .replace("{{SHOW_RATE}}", &format!("{:.1}", show_rate.show_rate_percent))
        .replace("{{SHOW_KEPT}}", &show_rate.total_kept.to_string())
        .replace("{{SHOW_BOOKED}}", &show_rate.total_booked.to_string())
        .replace("{{SHOW_MONTHS}}", &show_rate.months_covered.join(", "))
        .replace("{{STATUS_ROWS}}", &breakdown_rows(&metrics.status_breakdown))
        .replace("{{PROVIDER_ROWS}}", &provider_rows(providers))
        .replace("{{LANGUAGE_ROWS}}", &breakdown_rows(&metrics.language_breakdown))
        .replace("{{MEDIUM_ROWS}}", &breakdown_rows(&metrics.medium_breakdown))
}

fn breakdown_rows(rows: &[BreakdownRow]) -> String {
    if rows.is_empty() {
        return EMPTY_ROW.to_string();
    }
    rows.iter()
        .map(|row| {
            format!(
                r#"<tr><td>{}</td><td>{}</td><td><span class="bar" style="width:{:.1}%"></span>{:.1}%</td></tr>"#,
                escape(&row.label),
                row.count,
                row.percent,
                row.percent
            )
        })
        .collect()
}

fn provider_rows(providers: &[ProviderVolume]) -> String {
    if providers.is_empty() {
        return EMPTY_ROW.to_string();
    }
    providers
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}</td><td></td></tr>",
                escape(&row.provider_name),
                row.booked_count
            )
        })
        .collect()
}

/// Whole dollars with thousands separators, cents only when present.
fn format_money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match cents % 100 {
        0 => format!("${grouped}"),
        rest => format!("${grouped}.{rest:02}"),
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_login(message: Option<&str>) -> String {
    let message = message
        .map(|message| format!(r#"<p class="message">{}</p>"#, escape(message)))
        .unwrap_or_default();
    LOGIN_HTML.replace("{{MESSAGE}}", &message)
}

const EMPTY_ROW: &str = r#"<tr><td colspan="3" class="empty">No data for this range</td></tr>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Outreach Dashboard</title>
  <style>
    :root {
      --bg: #f6f7f9;
      --ink: #22272e;
      --muted: #6a737d;
      --accent: #82ca9d;
      --card: #ffffff;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Helvetica Neue", Arial, sans-serif;
      padding: 32px;
    }

    .kpis {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
      margin-bottom: 32px;
    }

    .kpi {
      background: var(--card);
      border-radius: 8px;
      padding: 20px;
      text-align: center;
    }

    .kpi h3 {
      margin: 0;
      color: var(--muted);
      font-weight: 500;
    }

    .kpi p {
      font-size: 1.5rem;
      margin: 8px 0 0;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: var(--card);
      margin-bottom: 32px;
    }

    th, td {
      text-align: left;
      padding: 8px;
      border-bottom: 1px solid #e1e4e8;
    }

    .bar {
      display: inline-block;
      height: 10px;
      background: var(--accent);
      margin-right: 8px;
      max-width: 60%;
    }

    .empty {
      color: var(--muted);
      text-align: center;
    }
  </style>
</head>
<body>
  <h1>Outreach Dashboard</h1>
  <p class="range">{{START}} to {{END}}</p>

  <section class="kpis">
    <div class="kpi"><h3>Total Sent</h3><p id="sent">{{SENT}}</p></div>
    <div class="kpi"><h3>Total Booked</h3><p id="booked">{{BOOKED}}</p></div>
    <div class="kpi"><h3>Percent Booked</h3><p id="percent">{{PERCENT}}%</p></div>
    <div class="kpi"><h3>Estimated Revenue</h3><p id="revenue">{{REVENUE}}</p></div>
    <div class="kpi">
      <h3>AI Show Rate</h3>
      <p id="show-rate">{{SHOW_RATE}}%</p>
      <small>{{SHOW_KEPT}} of {{SHOW_BOOKED}} kept, {{SHOW_MONTHS}}</small>
    </div>
  </section>
  <form method="post" action="/logout"><button type="submit">Logout</button></form>

  <h2>% of Bookings by Status</h2>
  <table>
    <thead><tr><th>Status</th><th>Count</th><th>Percent</th></tr></thead>
    <tbody>{{STATUS_ROWS}}</tbody>
  </table>

  <h2>Booked Volume by Provider</h2>
  <table>
    <thead><tr><th>Provider</th><th>Booked</th><th></th></tr></thead>
    <tbody>{{PROVIDER_ROWS}}</tbody>
  </table>

  <h2>Patient Language Distribution</h2>
  <table>
    <thead><tr><th>Language</th><th>Count</th><th>Percent</th></tr></thead>
    <tbody>{{LANGUAGE_ROWS}}</tbody>
  </table>

  <h2>Outreach Method Distribution</h2>
  <table>
    <thead><tr><th>Method</th><th>Count</th><th>Percent</th></tr></thead>
    <tbody>{{MEDIUM_ROWS}}</tbody>
  </table>
</body>
</html>
"#;

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Sign in</title>
  <style>
    body {
      display: grid;
      place-items: center;
      min-height: 100vh;
      margin: 0;
      background: #f9f9f9;
      font-family: "Helvetica Neue", Arial, sans-serif;
    }

    form {
      display: grid;
      gap: 10px;
      width: 280px;
      margin-bottom: 24px;
    }

    .message {
      color: #f44336;
    }
  </style>
</head>
<body>
  <main>
    {{MESSAGE}}
    <h2>Login</h2>
    <form method="post" action="/login">
      <input type="email" name="email" placeholder="Email" required />
      <input type="password" name="password" placeholder="Password" required />
      <button type="submit">Login</button>
    </form>
    <h2>Register</h2>
    <form method="post" action="/register">
      <input type="email" name="email" placeholder="Email" required />
      <input type="password" name="password" placeholder="Password" required />
      <button type="submit">Register</button>
    </form>
  </main>
</body>
</html>
"#;
