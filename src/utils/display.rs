//! Terminal display utilities for the CLI.
//!
//! Book titles are frequently Korean, whose syllables take two terminal
//! cells each, so every width calculation here goes through `unicode-width`
//! rather than byte or char counts.

use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::ResolvedBook;

/// Terminal information with cached size and capabilities.
#[derive(Debug, Clone)]
pub struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

const ELLIPSIS: &str = "...";

/// Get the global terminal information, initialized on first call.
pub fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| {
        let width = terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH);

        Terminal {
            width,
            is_tty: io::stdout().is_terminal(),
        }
    })
}

/// Get the current terminal width in cells.
#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(1)
}

/// Truncate text to fit within `max_width` terminal cells.
///
/// An ellipsis is appended when anything was cut.
///
/// ```
/// use book_scout::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("채식주의자", 7), "채식...");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }

    // Too narrow for any text: the ellipsis itself is cut to fit.
    if max_width <= ELLIPSIS.len() {
        return ELLIPSIS[..max_width].to_string();
    }

    let budget = max_width - ELLIPSIS.len();
    let mut used = 0;
    let mut kept = String::new();
    for c in text.chars() {
        let w = char_width(c);
        if used + w > budget {
            break;
        }
        used += w;
        kept.push(c);
    }

    format!("{}{}", kept, ELLIPSIS)
}

/// Truncate text at the last word boundary that fits.
///
/// Falls back to [`truncate_with_ellipsis`] when the first word alone is
/// too wide.
pub fn truncate_at_word(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }

    // Too narrow for any text: the ellipsis itself is cut to fit.
    if max_width <= ELLIPSIS.len() {
        return ELLIPSIS[..max_width].to_string();
    }

    let budget = max_width - ELLIPSIS.len();
    let mut used = 0;
    let mut last_break = None;
    for (idx, c) in text.char_indices() {
        if c == ' ' {
            last_break = Some(idx);
        }
        let w = char_width(c);
        if used + w > budget {
            break;
        }
        used += w;
    }

    match last_break {
        Some(idx) if !text[..idx].trim_end().is_empty() => {
            format!("{}{}", text[..idx].trim_end(), ELLIPSIS)
        }
        _ => truncate_with_ellipsis(text, max_width),
    }
}

/// Column width configuration for table display.
#[derive(Debug, Clone, Copy)]
pub struct ColumnConfig {
    pub min_width: usize,
    pub max_width: usize,
    pub weight: usize,
}

impl ColumnConfig {
    /// Create a new column config with minimum width.
    pub fn new(min_width: usize) -> Self {
        ColumnConfig {
            min_width,
            max_width: usize::MAX,
            weight: 1,
        }
    }

    /// Set the maximum width.
    pub fn max(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    /// Set the weight for space distribution.
    pub fn weight(mut self, weight: usize) -> Self {
        self.weight = weight;
        self
    }
}

/// Calculate column widths from a list of column configurations.
///
/// Every column gets its minimum, then the remaining space is shared by
/// weight without exceeding any column's maximum.
pub fn calculate_column_widths(terminal_width: usize, configs: &[ColumnConfig]) -> Vec<usize> {
    let mut widths: Vec<usize> = configs.iter().map(|c| c.min_width).collect();

    // one separator between each pair of columns
    let available = terminal_width.saturating_sub(configs.len().saturating_sub(1));
    let min_sum: usize = widths.iter().sum();
    if min_sum >= available {
        return widths;
    }

    let mut remaining = available - min_sum;
    loop {
        let open: Vec<usize> = (0..configs.len())
            .filter(|&i| configs[i].weight > 0 && widths[i] < configs[i].max_width)
            .collect();
        let total_weight: usize = open.iter().map(|&i| configs[i].weight).sum();
        if remaining == 0 || total_weight == 0 {
            break;
        }

        let mut given = 0;
        for &i in &open {
            let share = (remaining * configs[i].weight / total_weight).max(1);
            let room = configs[i].max_width - widths[i];
            let take = share.min(room).min(remaining - given);
            widths[i] += take;
            given += take;
        }
        if given == 0 {
            break;
        }
        remaining -= given;
    }

    widths
}

/// Widths of the (title, authors) columns of the book table.
///
/// Pages, origin and saved columns are narrow and fixed.
pub fn get_book_table_columns(terminal_width: usize) -> (usize, usize) {
    let configs = [
        ColumnConfig::new(20).max(70).weight(2),
        ColumnConfig::new(12).max(40).weight(1),
        ColumnConfig::new(5).max(5).weight(0),
        ColumnConfig::new(9).max(9).weight(0),
        ColumnConfig::new(5).max(5).weight(0),
    ];
    // borders and padding of a five column UTF8 table
    let chrome = 16;

    let widths = calculate_column_widths(terminal_width.saturating_sub(chrome), &configs);
    (widths[0], widths[1])
}

/// Format an author list for display.
pub fn format_authors(authors: &[String], max_width: usize) -> String {
    if authors.is_empty() {
        return "-".to_string();
    }
    truncate_with_ellipsis(&authors.join(", "), max_width)
}

/// Format a page count for display.
pub fn format_pages(pages: Option<u32>) -> String {
    pages.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
}

/// Build the book results table.
pub fn book_table(books: &[ResolvedBook], terminal_width: usize) -> Table {
    let (title_width, authors_width) = get_book_table_columns(terminal_width);

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["Title", "Authors", "Pages", "Origin", "Saved"]);

    for resolved in books {
        let book = &resolved.book;
        table.add_row(vec![
            Cell::new(truncate_at_word(&book.title, title_width)).add_attribute(Attribute::Bold),
            Cell::new(format_authors(&book.authors, authors_width)),
            Cell::new(format_pages(book.page_count)).set_alignment(CellAlignment::Right),
            Cell::new(resolved.origin),
            Cell::new(if resolved.in_library { "yes" } else { "" }),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookCandidate, Origin};

    #[test]
    fn test_truncate_with_ellipsis_basic() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_with_ellipsis_empty() {
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 0), "");
    }

    #[test]
    fn test_truncate_never_exceeds_narrow_width() {
        assert_eq!(truncate_with_ellipsis("Hello", 1), ".");
        assert_eq!(truncate_with_ellipsis("Hello", 2), "..");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
        assert_eq!(truncate_with_ellipsis("채식주의자", 2), "..");
    }

    #[test]
    fn test_truncate_counts_wide_characters() {
        // five syllables, ten cells
        assert_eq!(truncate_with_ellipsis("채식주의자", 10), "채식주의자");
        assert_eq!(truncate_with_ellipsis("채식주의자", 9), "채식주...");
        assert!(UnicodeWidthStr::width(truncate_with_ellipsis("채식주의자", 8).as_str()) <= 8);
    }

    #[test]
    fn test_truncate_at_word() {
        assert_eq!(truncate_at_word("The quick brown fox", 12), "The quick...");
        assert_eq!(truncate_at_word("Hello World", 10), "Hello...");
        assert_eq!(truncate_at_word("Short", 10), "Short");
    }

    #[test]
    fn test_truncate_at_word_korean() {
        let title = "박시백의 조선왕조실록 1 태조실록";
        let cut = truncate_at_word(title, 20);
        assert_eq!(cut, "박시백의...");
        assert!(UnicodeWidthStr::width(cut.as_str()) <= 20);
    }

    #[test]
    fn test_calculate_column_widths_min_exceeded() {
        let configs = [ColumnConfig::new(30), ColumnConfig::new(30)];
        assert_eq!(calculate_column_widths(50, &configs), vec![30, 30]);
    }

    #[test]
    fn test_calculate_column_widths_respects_max() {
        let configs = [
            ColumnConfig::new(10).max(20).weight(1),
            ColumnConfig::new(10).weight(1),
            ColumnConfig::new(4).max(4).weight(0),
        ];
        let widths = calculate_column_widths(100, &configs);
        assert_eq!(widths[0], 20);
        assert_eq!(widths[2], 4);
        assert_eq!(widths.iter().sum::<usize>(), 98);
    }

    #[test]
    fn test_get_book_table_columns() {
        let (title, authors) = get_book_table_columns(100);
        assert!(title >= 20);
        assert!(authors >= 12);
        assert!(title > authors);
        assert!(title + authors + 5 + 9 + 5 + 16 + 4 <= 100);
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_pages(Some(320)), "320");
        assert_eq!(format_pages(None), "-");
        assert_eq!(format_authors(&[], 10), "-");
        assert_eq!(
            format_authors(&["A".to_string(), "B".to_string()], 10),
            "A, B"
        );
    }

    #[test]
    fn test_book_table_rows() {
        let books = vec![
            ResolvedBook {
                book: BookCandidate::new("1", "Dune").authors(["Frank Herbert"]),
                origin: Origin::Primary,
                in_library: true,
            },
            ResolvedBook {
                book: BookCandidate::new("2", "Emma"),
                origin: Origin::Secondary,
                in_library: false,
            },
        ];
        let rendered = book_table(&books, 100).to_string();
        assert!(rendered.contains("Dune"));
        assert!(rendered.contains("secondary"));
        assert!(rendered.contains("yes"));
    }
}
