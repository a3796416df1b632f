//! Terminal rendering for quotes and analysis sources

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use radar_core::{PriceDataPoint, SourceRef, Stock};
use std::fmt::Write;

/// Quote summary as a two-column table
pub fn quote_table(stock: &Stock) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new(&stock.name), Cell::new(&stock.ticker)]);

    let rows = [
        ("Price", format!("{:.2} {}", stock.price, stock.currency)),
        ("Change", format!("{:+.2}", stock.change)),
        ("Change %", format!("{:+.2}%", stock.change_percent)),
        ("Market cap", format_count(stock.market_cap)),
        ("Volume", format_count(stock.volume)),
    ];
    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// The last `days` points of the history, oldest first
pub fn history_table(history: &[PriceDataPoint], days: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Date", "Close"]);

    let start = history.len().saturating_sub(days);
    for point in &history[start..] {
        table.add_row(vec![
            Cell::new(&point.date),
            Cell::new(format!("{:.2}", point.price)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Numbered source list printed after an analysis
pub fn source_list(sources: &[SourceRef]) -> String {
    let mut out = String::new();
    if sources.is_empty() {
        return out;
    }

    out.push_str("Sources:\n");
    for (i, source) in sources.iter().enumerate() {
        let _ = writeln!(out, "  [{}] {} <{}>", i + 1, source.title, source.uri);
    }
    out
}

/// Group digits in thousands: `1234567` becomes `1 234 567`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
