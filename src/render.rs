use analytics::{Dashboard, SeriesPoint};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

/// Placeholder for metrics that are undefined over the window.
const UNDEFINED: &str = "n/a";

pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => UNDEFINED.to_string(),
    }
}

pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => UNDEFINED.to_string(),
    }
}

fn last_value(points: &[SeriesPoint]) -> Option<f64> {
    points.last().map(|p| p.value)
}

/// Builds the KPI table shown at the top of the report.
pub fn kpi_table(dashboard: &Dashboard) -> Table {
    let kpis = &dashboard.kpis;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);

    table.add_row(vec!["Sharpe Ratio".to_string(), format_ratio(kpis.sharpe)]);
    table.add_row(vec!["Volatility (annualized)".to_string(), format_pct(kpis.volatility)]);
    table.add_row(vec!["Max Drawdown".to_string(), format_pct(Some(kpis.max_drawdown))]);
    table.add_row(vec![kpis.return_label.to_string(), format_pct(Some(kpis.return_value))]);
    table
}

/// Builds the summary of the chart series: where each curve ends.
pub fn series_table(dashboard: &Dashboard) -> Table {
    let series = &dashboard.series;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Series", "Points", "Latest"]);

    let rows: Vec<(String, &[SeriesPoint])> = vec![
        (format!("{} cumulative return", dashboard.ticker), series.cumulative_return.as_slice()),
        (
            format!("{} cumulative return", dashboard.benchmark),
            dashboard.benchmark_cumulative_return.as_slice(),
        ),
        ("Drawdown".to_string(), series.drawdown.as_slice()),
        ("Rolling volatility (annualized)".to_string(), series.rolling_volatility.as_slice()),
        ("Daily return".to_string(), series.daily_returns.as_slice()),
    ];

    for (name, points) in rows {
        table.add_row(vec![name, points.len().to_string(), format_pct(last_value(points))]);
    }
    table
}

pub fn print_dashboard(dashboard: &Dashboard) {
    println!(
        "{} - Performance Dashboard ({} vs {})",
        dashboard.ticker, dashboard.range, dashboard.benchmark
    );
    println!("{}", kpi_table(dashboard));
    println!("{}", series_table(dashboard));
}
