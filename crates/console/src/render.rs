//! Text rendering of list views: a table on wide terminals, stacked cards
//! on narrow ones, followed by a pagination footer.

use std::fmt::Write;

use verger_core::record::{display_value, Record};
use verger_core::schema::EntitySchema;
use verger_core::view::ListView;

/// Narrowest width, in columns, that gets the table layout.
pub const CARD_BREAKPOINT: usize = 80;

/// Header of the identifier column for backend-keyed entities.
const KEY_HEADER: &str = "ID";

/// Cells wider than this are truncated in table layout.
const MAX_CELL_WIDTH: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Table,
    Cards,
}

impl Layout {
    pub fn for_width(width: usize) -> Self {
        if width >= CARD_BREAKPOINT {
            Layout::Table
        } else {
            Layout::Cards
        }
    }
}

/// Render one page of `view` for a terminal `width` columns wide.
pub fn render_list(schema: &EntitySchema, view: &ListView, width: usize) -> String {
    if let Some(empty) = view.empty {
        return format!("{}\n", empty.message());
    }
    let mut out = match Layout::for_width(width) {
        Layout::Table => render_table(schema, &view.rows),
        Layout::Cards => render_cards(schema, &view.rows),
    };
    out.push('\n');
    out.push_str(&footer(view));
    out.push('\n');
    out
}

/// "Page x of y · n records", noting the unfiltered total when a search
/// narrowed the list.
pub fn footer(view: &ListView) -> String {
    let noun = if view.matched == 1 { "record" } else { "records" };
    let mut footer = format!(
        "Page {} of {} · {} {noun}",
        view.page,
        view.page_count.max(1),
        view.matched
    );
    if view.matched != view.total {
        let _ = write!(footer, " (of {})", view.total);
    }
    footer
}

/// Aligned table of `rows`. Backend-assigned identifiers are not form
/// fields, so they get a leading column of their own.
pub fn render_table(schema: &EntitySchema, rows: &[Record]) -> String {
    let columns = columns(schema);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|(name, _)| truncate(&display_value(row.get(*name)), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, (_, label))| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<&str> = columns.iter().map(|(_, label)| *label).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

pub fn render_cards(schema: &EntitySchema, rows: &[Record]) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&render_record(schema, row));
    }
    out
}

/// One record as a card: a heading then one `Label: value` line per field.
pub fn render_record(schema: &EntitySchema, record: &Record) -> String {
    let label_width = schema
        .fields
        .iter()
        .map(|def| def.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "[{} {}]\n",
        schema.name,
        display_value(record.get(schema.key_field))
    );
    for def in schema.fields {
        let _ = writeln!(
            out,
            "  {:<label_width$}  {}",
            format!("{}:", def.label),
            display_value(record.get(def.name)),
            label_width = label_width + 1,
        );
    }
    out
}

// ---- private helpers ----

/// `(field name, header)` pairs for table layout.
fn columns(schema: &EntitySchema) -> Vec<(&'static str, &'static str)> {
    let key = schema
        .field(schema.key_field)
        .is_none()
        .then_some((schema.key_field, KEY_HEADER));
    key.into_iter()
        .chain(schema.fields.iter().map(|def| (def.name, def.label)))
        .collect()
}

fn push_row(out: &mut String, cells: &[impl AsRef<str>], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
