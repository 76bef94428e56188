//! Console output for the trainer binary

use eshop_forecast_core::MetricsSummary;
use std::io::{self, BufRead, Write};

const RULE_WIDTH: usize = 100;

pub fn write_header_to<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    Ok(())
}

pub fn write_exception_to<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", "!".repeat(RULE_WIDTH))?;
    writeln!(out, "EXCEPTION")?;
    writeln!(out, "{}", "!".repeat(RULE_WIDTH))?;
    writeln!(out, "{message}")?;
    Ok(())
}

/// Average and standard deviation of every fold metric
pub fn write_regression_folds_average_metrics<W: Write>(
    out: &mut W,
    algorithm: &str,
    summary: &MetricsSummary,
) -> io::Result<()> {
    let rows = [
        ("L1 Loss", &summary.mean_absolute_error),
        ("L2 Loss", &summary.mean_squared_error),
        ("RMS", &summary.root_mean_squared_error),
        ("Loss Function", &summary.loss_function),
        ("R-squared", &summary.r_squared),
    ];

    writeln!(out, "{}", "*".repeat(RULE_WIDTH))?;
    writeln!(out, "*       Metrics for {algorithm} Regression model")?;
    writeln!(out, "*{}", "-".repeat(RULE_WIDTH - 1))?;
    for (name, stats) in rows {
        writeln!(
            out,
            "*       Average {:<15} {:.3}  (std dev {:.3})",
            format!("{name}:"),
            stats.mean,
            stats.std_dev
        )?;
    }
    writeln!(out, "{}", "*".repeat(RULE_WIDTH))?;
    Ok(())
}

pub fn write_header(title: &str) {
    let _ = write_header_to(&mut io::stdout().lock(), title);
}

pub fn write_exception(message: &str) {
    let _ = write_exception_to(&mut io::stdout().lock(), message);
}

pub fn print_regression_folds_average_metrics(algorithm: &str, summary: &MetricsSummary) {
    let _ = write_regression_folds_average_metrics(&mut io::stdout().lock(), algorithm, summary);
}

/// Block until a line (or EOF) arrives on stdin
pub fn press_any_key() {
    print!("Press any key to finish.");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
