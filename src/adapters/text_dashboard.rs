//! Plain-text rendering of an engine snapshot for terminal output.

use std::fmt::Write;

use crate::domain::alert::SystemAlert;
use crate::domain::engine::EngineSnapshot;
use crate::domain::history::ProfitLossPoint;
use crate::domain::metrics::PerformanceMetrics;
use crate::domain::quote::Quote;

pub fn render(snapshot: &EngineSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&render_market_table(&snapshot.quotes));
    out.push('\n');
    out.push_str(&render_metrics(&snapshot.metrics));
    out.push('\n');
    out.push_str(&render_history_summary(&snapshot.history));
    out.push('\n');
    out.push_str(&render_alerts(&snapshot.alerts));
    out
}

pub fn render_market_table(quotes: &[Quote]) -> String {
    if quotes.is_empty() {
        return "No market data available.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>10} {:>18} {:>9} {:>8}",
        "Ticker", "Price", "Change", "Volume", "Status"
    );
    out.push_str(&"-".repeat(57));
    out.push('\n');
    for q in quotes {
        let change = format!("{:.2} ({:.2}%)", q.change, q.change_percent);
        let _ = writeln!(
            out,
            "{:<8} {:>10} {:>18} {:>9} {:>8}",
            q.ticker,
            format!("${:.2}", q.price),
            change,
            q.volume,
            q.trend().label()
        );
    }
    out
}

pub fn render_metrics(metrics: &PerformanceMetrics) -> String {
    let sign = if metrics.net_profit_loss >= 0.0 { "+" } else { "-" };
    let mut out = String::new();
    let _ = writeln!(out, "Net P/L:            {}${:.2}", sign, metrics.net_profit_loss.abs());
    let _ = writeln!(out, "Win rate:           {:.1}%", metrics.win_rate);
    let _ = writeln!(out, "Total trades:       {}", metrics.total_trades);
    let _ = writeln!(out, "Avg trade duration: {}", metrics.avg_trade_duration);
    out
}

pub fn render_history_summary(history: &[ProfitLossPoint]) -> String {
    let (first, last) = match (history.first(), history.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return "P/L history: no data\n".to_string(),
    };
    let min = history.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = history.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    format!(
        "P/L history: {} points, first {:.2}, last {:.2}, min {:.2}, max {:.2}\n",
        history.len(),
        first.value,
        last.value,
        min,
        max
    )
}

pub fn render_alerts(alerts: &[SystemAlert]) -> String {
    if alerts.is_empty() {
        return "No system alerts.\n".to_string();
    }
    let mut out = String::new();
    for alert in alerts {
        let marker = if alert.is_destructive() { "[!]" } else { "[i]" };
        let _ = writeln!(
            out,
            "{} {} {}: {}",
            marker,
            alert.created_at.format("%H:%M:%S"),
            alert.title,
            alert.description
        );
    }
    out
}
