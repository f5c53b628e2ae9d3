//! Lookup command - query every source for a product code.

use stockfan::{AggregateResult, MatchMode};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the lookup command.
pub struct LookupArgs {
    pub code: String,
    pub json: bool,
    pub exact: bool,
    pub stats: bool,
}

/// Run the lookup command.
pub fn run(runner: &CliRunner, args: LookupArgs) -> Result<(), CliError> {
    runner.log_startup("lookup");

    let mode = args.exact.then_some(MatchMode::Exact);
    let app = runner.start_app(mode)?;

    let outcome = app.lookup_blocking(&args.code);
    let metrics = app.metrics().snapshot();
    app.shutdown_sync();

    let result = outcome?;
    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::Output(e.to_string()))?;
        println!("{}", json);
    } else {
        print!("{}", format_table(&result));
    }

    if args.stats {
        println!();
        println!("Lookup Statistics");
        println!("─────────────────");
        println!("{}", metrics);
    }

    Ok(())
}

/// Render rows as an aligned text table.
pub fn format_table(result: &AggregateResult) -> String {
    const HEADERS: [&str; 4] = ["SOURCE", "CODE", "UNITS", "CASES"];

    let cells: Vec<[String; 4]> = result
        .iter()
        .map(|row| {
            [
                row.source_id.clone(),
                row.product_code.clone(),
                format_units(row.quantity_units),
                row.quantity_cases.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = format!(
        "{:<w0$}  {:<w1$}  {:>w2$}  {:>w3$}",
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    );
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Whole numbers without a fractional part, others with up to 3 decimals.
fn format_units(units: f64) -> String {
    if units.fract() == 0.0 {
        format!("{:.0}", units)
    } else {
        let s = format!("{:.3}", units);
        s.trim_end_matches('0').to_string()
    }
}
