//! CSV and Excel workbooks rendered as text tables.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::error::ExtractionError;
use crate::table::{TextTable, MISSING};

/// Parse a CSV file whose first record is the header row.
pub fn read_csv(path: &Path) -> Result<TextTable, ExtractionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(TextTable::new(headers, rows))
}

/// Parse the first worksheet of an .xlsx / .xls workbook; its first row is
/// the header row.
pub fn read_workbook(path: &Path) -> Result<TextTable, ExtractionError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ExtractionError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExtractionError::Spreadsheet("workbook has no worksheets".to_string()))?
        .map_err(|e| ExtractionError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(header_text).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_text).collect()).collect();

    debug!(rows = rows.len(), "Worksheet parsed");
    Ok(TextTable::new(headers, rows))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => cell_text(other),
    }
}

/// Display string for one worksheet cell.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => MISSING.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_csv_two_by_two() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.csv", "a,b\n1,2\n3,4\n");

        let table = read_csv(&path).unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.render(), "   a  b\n0  1  2\n1  3  4");
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "r.csv", "x,y\n1\n2,3\n");

        let table = read_csv(&path).unwrap();
        assert_eq!(table.render(), "   x    y\n0  1  NaN\n1  2    3");
    }

    #[test]
    fn test_read_csv_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "h.csv", "id,name\n");

        let table = read_csv(&path).unwrap();
        assert_eq!(
            table.render(),
            "Empty DataFrame\nColumns: [id, name]\nIndex: []"
        );
    }

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Cities" sheetId="1" r:id="rId1"/><sheet name="Other" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

    const CITIES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>city</t></is></c><c r="B1" t="inlineStr"><is><t>pop</t></is></c><c r="C1" t="inlineStr"><is><t>big</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>north</t></is></c><c r="B2"><v>120</v></c><c r="C2" t="b"><v>1</v></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>south</t></is></c><c r="B3"><v>45</v></c><c r="C3" t="b"><v>0</v></c></row>
</sheetData></worksheet>"#;

    const OTHER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>ignored</t></is></c></row>
</sheetData></worksheet>"#;

    fn write_xlsx(path: &std::path::Path) {
        use std::io::Write;

        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", CITIES),
            ("xl/worksheets/sheet2.xml", OTHER),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_read_workbook_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.xlsx");
        write_xlsx(&path);

        let table = read_workbook(&path).unwrap();
        assert_eq!(table.headers, vec!["city", "pop", "big"]);
        assert_eq!(
            table.render(),
            "    city  pop    big\n0  north  120   True\n1  south   45  False"
        );
    }

    #[test]
    fn test_read_workbook_rejects_non_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.xlsx", "not a workbook");

        let result = read_workbook(&path);
        assert!(matches!(result, Err(ExtractionError::Spreadsheet(_))));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "NaN");
        assert_eq!(cell_text(&Data::Float(3.0)), "3");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "True");
        assert_eq!(cell_text(&Data::String("north".to_string())), "north");
    }
}
