//! Plain-text rendering of tabular data.
//!
//! Layout follows the familiar dataframe printout: a left-aligned row index,
//! right-aligned data columns, two spaces between columns.

/// Cell value rendered for missing data.
pub const MISSING: &str = "NaN";

const COLUMN_GAP: &str = "  ";

/// A header row plus data rows, all as display strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    fn header(&self, col: usize) -> String {
        match self.headers.get(col) {
            Some(h) if !h.is_empty() => h.clone(),
            _ => format!("Unnamed: {}", col),
        }
    }

    fn cell<'a>(row: &'a [String], col: usize) -> &'a str {
        match row.get(col) {
            Some(v) if !v.is_empty() => v,
            _ => MISSING,
        }
    }

    /// Render the table. No trailing newline.
    pub fn render(&self) -> String {
        let ncols = self.column_count();
        let headers: Vec<String> = (0..ncols).map(|c| self.header(c)).collect();

        if self.rows.is_empty() {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                headers.join(", ")
            );
        }

        let index_width = (self.rows.len() - 1).to_string().len();
        let widths: Vec<usize> = (0..ncols)
            .map(|c| {
                self.rows
                    .iter()
                    .map(|r| Self::cell(r, c).chars().count())
                    .chain(std::iter::once(headers[c].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 1);

        let mut header_line = " ".repeat(index_width);
        for (h, w) in headers.iter().zip(&widths) {
            header_line.push_str(COLUMN_GAP);
            header_line.push_str(&format!("{:>width$}", h, width = *w));
        }
        lines.push(header_line);

        for (i, row) in self.rows.iter().enumerate() {
            let mut line = format!("{:<width$}", i, width = index_width);
            for (c, w) in widths.iter().enumerate() {
                line.push_str(COLUMN_GAP);
                line.push_str(&format!("{:>width$}", Self::cell(row, c), width = *w));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}
