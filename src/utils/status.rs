use crate::table::TableRows;
use comfy_table::{Attribute, Cell, CellAlignment, Table};

/// Renders table rows for the terminal, marking selected rows.
pub fn render_rows(title: &str, description: &str, rows: &TableRows) -> String {
    let mut header = vec![
        Cell::new("")
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Center),
        Cell::new("OID")
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Center),
    ];
    header.extend(rows.headers.iter().map(|label| {
        Cell::new(label)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Center)
    }));

    let mut table = Table::new();
    table
        .set_header(header)
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    for row in &rows.rows {
        let marker = if row.selected { "✅" } else { "" };
        let mut cells = vec![
            Cell::new(marker).set_alignment(CellAlignment::Center),
            Cell::new(row.object_id).set_alignment(CellAlignment::Right),
        ];
        cells.extend(row.values.iter().map(Cell::new));
        table.add_row(cells);
    }

    format!("{}\n{}\n{}", title, description, table)
}

pub fn print_rows(title: &str, description: &str, rows: &TableRows) {
    println!("\n{}\n", render_rows(title, description, rows));
}
