//! Rendering of command results as tables or JSON.
//!
//! Table output goes through a per-command row type so columns stay narrow;
//! JSON output always serializes the underlying records unchanged.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};
use uuid::Uuid;

use bugtrack_core::types::pagination::PageResponse;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Render `items`, as `to_row` rows for tables or as-is for JSON.
pub fn render<T, R>(items: &[T], format: OutputFormat, empty: &str, to_row: impl Fn(&T) -> R)
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table if items.is_empty() => println!("{empty}"),
        OutputFormat::Table => println!("{}", Table::new(items.iter().map(to_row))),
        OutputFormat::Json => print_json(&items),
    }
}

/// Render one page of results; tables get a position footer.
pub fn render_page<T, R>(
    page: &PageResponse<T>,
    format: OutputFormat,
    empty: &str,
    to_row: impl Fn(&T) -> R,
) where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Json => print_json(page),
        OutputFormat::Table => {
            render(&page.items, format, empty, to_row);
            if !page.items.is_empty() {
                println!("{}", page_footer(page));
            }
        }
    }
}

fn page_footer<T>(page: &PageResponse<T>) -> String {
    let first = (page.page - 1) * page.page_size + 1;
    let last = first + page.items.len() as u64 - 1;
    let mut footer = format!("Showing {first}-{last} of {}", page.total_items);
    if page.has_next() {
        footer.push_str(&format!("; next: --page {}", page.page + 1));
    }
    footer
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Cannot encode output: {e}")),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}

/// First eight characters of an id, for narrow table columns
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Second-precision UTC timestamp for table cells
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugtrack_core::types::pagination::PageRequest;

    #[test]
    fn test_page_footer() {
        let request = PageRequest::new(2, 10);
        let page = PageResponse::new(vec![0; 10], &request, 35);
        assert_eq!(page_footer(&page), "Showing 11-20 of 35; next: --page 3");

        let last = PageResponse::new(vec![0; 5], &PageRequest::new(4, 10), 35);
        assert_eq!(page_footer(&last), "Showing 31-35 of 35");
    }

    #[test]
    fn test_short_id() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(short_id(&id), "67e55044");
    }
}
