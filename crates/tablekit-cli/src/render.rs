//! Terminal rendering of table views

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use tablekit_core::{FilterPreset, RowSelection, SelectionState, SortDirection};
use tablekit_filters::FilterOption;
use tablekit_services::{cell_text, ColumnHeader, PaginationFooter, TableBody, TableView};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_label(column: &ColumnHeader) -> String {
    let arrow = match column.sort {
        Some(SortDirection::Asc) => " ↑",
        Some(SortDirection::Desc) => " ↓",
        None => "",
    };
    match column.sort_index {
        Some(index) => format!("{}{}{}", column.header, arrow, index),
        None => format!("{}{}", column.header, arrow),
    }
}

/// Render a table view: header, body (or placeholder) and pagination footer
pub fn render_view(view: &TableView) -> String {
    let mut out = String::new();

    if let Some(banner) = &view.error_banner {
        out.push_str(&format!("! Refresh failed, showing previous results: {banner}\n"));
    }

    match &view.body {
        TableBody::Rows { rows } => {
            let mut table = new_table();
            table.set_header(view.columns.iter().map(|c| Cell::new(header_label(c))));
            for row in rows {
                table.add_row(row.cells.iter().map(|value| Cell::new(cell_text(value))));
            }
            out.push_str(&table.to_string());
            out.push('\n');
        }
        TableBody::Empty { message } => {
            let mut table = new_table();
            table.set_header(view.columns.iter().map(|c| Cell::new(header_label(c))));
            table.add_row(vec![Cell::new(message)]);
            out.push_str(&table.to_string());
            out.push('\n');
        }
        TableBody::Loading { .. } => out.push_str("Loading...\n"),
        TableBody::Error { message } => out.push_str(&format!("Error: {message}\n")),
    }

    out.push_str(&render_footer(&view.footer));
    out
}

pub fn render_footer(footer: &PaginationFooter) -> String {
    format!(
        "{} of {} row(s). Page {} of {} ({} per page)\n",
        footer.row_count,
        footer.total_count,
        footer.page_number,
        footer.page_count,
        footer.page_size,
    )
}

/// Selection line under the footer, with the header checkbox state
pub fn render_selection(selection: &RowSelection) -> String {
    let mark = match selection.state() {
        SelectionState::Checked => "[x]",
        SelectionState::Indeterminate => "[-]",
        SelectionState::Unchecked => "[ ]",
    };
    let ids = selection.selected_ids().collect::<Vec<_>>().join(", ");
    format!(
        "{mark} {} of {} row(s) selected: {ids}\n",
        selection.selected_count(),
        selection.page_ids().len(),
    )
}

pub fn render_presets(presets: &[&FilterPreset]) -> String {
    let mut table = new_table();
    table.set_header(vec!["ID", "Name", "Description", "Filters", "Built-in", "Created"]);
    for preset in presets {
        let filters = preset
            .filters
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&preset.id),
            Cell::new(&preset.name),
            Cell::new(preset.description.as_deref().unwrap_or("")),
            Cell::new(filters),
            Cell::new(if preset.is_built_in { "yes" } else { "no" }),
            Cell::new(preset.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table.to_string()
}

pub fn render_facet(title: &str, options: &[FilterOption]) -> String {
    let mut table = new_table();
    table.set_header(vec![title.to_string(), "Count".to_string()]);
    for option in options {
        let count = option.count.map(|c| c.to_string()).unwrap_or_default();
        table.add_row(vec![option.label.clone(), count]);
    }
    table.to_string()
}
