//! Human-readable run summary for the terminal.

use crate::domain::backtest::BacktestConfig;
use crate::domain::summary::SummaryMetrics;

/// Group an integer string with commas: "1234567" -> "1,234,567".
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_grouped(x: f64) -> String {
    let fixed = format!("{:.2}", x.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if x < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

/// `$1,234.56`. Non-finite values are printed as-is.
pub fn fmt_money(x: f64, prefix: &str) -> String {
    if !x.is_finite() {
        return x.to_string();
    }
    format!("{}{}", prefix, format_grouped(x))
}

/// A fraction as a percentage: 0.1234 -> `12.34%`, with an optional suffix.
pub fn fmt_pct(x: f64, suffix: &str) -> String {
    if !x.is_finite() {
        return x.to_string();
    }
    let pct = format!("{}%", format_grouped(x * 100.0));
    if suffix.is_empty() {
        pct
    } else {
        format!("{} {}", pct, suffix)
    }
}

/// The summary block printed after a run.
pub fn render_summary(
    config: &BacktestConfig,
    summary: &SummaryMetrics,
    final_equity: f64,
) -> String {
    let mut lines = vec![
        "=== Strategy Rules ===".to_string(),
        format!(
            "Buy when FGI < {}  |  Sell when FGI > {}  |  Execution: {}  |  Fee: {} bps",
            config.buy_threshold,
            config.sell_threshold,
            config.timing.label(),
            config.fee_bps
        ),
        String::new(),
        "=== Results ===".to_string(),
    ];
    lines.push(format!(
        "Strategy Return:  {}  ({})",
        fmt_pct(summary.strategy_return, ""),
        fmt_pct(summary.strategy_cagr, "a.a.")
    ));
    lines.push(format!(
        "Buy&Hold Return:  {}  ({})",
        fmt_pct(summary.bh_return, ""),
        fmt_pct(summary.bh_cagr, "a.a.")
    ));
    lines.push(format!("Max Drawdown:     {}", fmt_pct(summary.strategy_mdd, "")));
    lines.push(format!("Trades:           {}", summary.n_trades));
    lines.push(format!(
        "Final Equity:     {}  (from {})",
        fmt_money(final_equity, "$"),
        fmt_money(config.initial_capital, "$")
    ));
    lines.join("\n")
}
