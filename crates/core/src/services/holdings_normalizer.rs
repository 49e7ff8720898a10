use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use std::io::Cursor;

use crate::errors::CoreError;
use crate::models::holding::Holding;

const COL_SYMBOL: &str = "Symbol";
const COL_QUANTITY: &str = "Quantity";
const COL_BUY_PRICE: &str = "BuyPrice";
const COL_BUY_DATE: &str = "BuyDate";

/// Accepted text date layouts, tried in order. Slash dates with the year last
/// are read month-first, then day-first when that is not a valid date.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// How an uploaded file is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Delimited text with the given field separator
    Delimited(u8),
    /// xlsx / xlsm / xls / ods workbook; the first worksheet is read
    Spreadsheet,
}

impl UploadFormat {
    /// Pick a format from the file extension, sniffing the content when the
    /// extension is missing or unfamiliar.
    pub fn detect(file_name: &str, bytes: &[u8]) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "txt" => UploadFormat::Delimited(b','),
            "tsv" => UploadFormat::Delimited(b'\t'),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => UploadFormat::Spreadsheet,
            _ if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) => {
                UploadFormat::Spreadsheet
            }
            _ => UploadFormat::Delimited(b','),
        }
    }
}

/// One cell of the uploaded table, before validation.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Rows keyed by their 1-based position in the file (header included).
struct RawTable {
    headers: Vec<String>,
    rows: Vec<(usize, Vec<Cell>)>,
}

struct ColumnIndex {
    symbol: usize,
    quantity: usize,
    buy_price: usize,
    buy_date: usize,
}

/// Parses an uploaded holdings file into validated `Holding` rows.
///
/// Required columns: `Symbol`, `Quantity`, `BuyPrice`, `BuyDate`. Header
/// matching ignores case, surrounding whitespace, inner spaces and
/// underscores, so "buy price" and "BUY_PRICE" both match `BuyPrice`.
/// Any invalid row rejects the whole file.
#[derive(Debug, Default)]
pub struct HoldingsNormalizer;

impl HoldingsNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Detect the format of an upload and parse it.
    pub fn parse_upload(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<Holding>, CoreError> {
        let format = UploadFormat::detect(file_name, bytes);
        tracing::debug!(file_name, ?format, size = bytes.len(), "parsing upload");
        let table = match format {
            UploadFormat::Delimited(delimiter) => Self::read_delimited(bytes, delimiter)?,
            UploadFormat::Spreadsheet => Self::read_spreadsheet(bytes)?,
        };
        Self::normalize(table)
    }

    /// Parse delimited text (CSV/TSV).
    pub fn parse_delimited(&self, bytes: &[u8], delimiter: u8) -> Result<Vec<Holding>, CoreError> {
        Self::normalize(Self::read_delimited(bytes, delimiter)?)
    }

    /// Parse the first worksheet of a spreadsheet workbook.
    pub fn parse_spreadsheet(&self, bytes: &[u8]) -> Result<Vec<Holding>, CoreError> {
        Self::normalize(Self::read_spreadsheet(bytes)?)
    }

    // ── Decoding ────────────────────────────────────────────────────

    fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<RawTable, CoreError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(i + 2);
            let cells = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            rows.push((line, cells));
        }

        Ok(RawTable { headers, rows })
    }

    fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable, CoreError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| CoreError::Parse("spreadsheet has no worksheets".into()))??;

        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut sheet_rows = range
            .rows()
            .enumerate()
            .map(|(i, row)| (first_row + i + 1, row.iter().map(cell_from_data).collect::<Vec<_>>()))
            .skip_while(|(_, cells)| cells.iter().all(Cell::is_blank));

        let headers = match sheet_rows.next() {
            Some((_, cells)) => cells
                .into_iter()
                .map(|cell| match cell {
                    Cell::Text(s) => s,
                    Cell::Number(n) => n.to_string(),
                    Cell::Date(d) => d.to_string(),
                    Cell::Empty => String::new(),
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(RawTable {
            headers,
            rows: sheet_rows.collect(),
        })
    }

    // ── Validation ──────────────────────────────────────────────────

    fn normalize(table: RawTable) -> Result<Vec<Holding>, CoreError> {
        let columns = Self::resolve_columns(&table.headers)?;

        let mut holdings = Vec::with_capacity(table.rows.len());
        for (row, cells) in table.rows {
            if cells.iter().all(Cell::is_blank) {
                continue;
            }
            let cell = |idx: usize| cells.get(idx).unwrap_or(&EMPTY_CELL);
            let invalid = |message: String| CoreError::InvalidRow { row, message };

            let symbol = match cell(columns.symbol) {
                Cell::Text(s) => s.trim().to_uppercase(),
                Cell::Number(n) => n.to_string(),
                _ => String::new(),
            };
            if symbol.is_empty() {
                return Err(invalid(format!("{COL_SYMBOL} is empty")));
            }

            let quantity = parse_number(cell(columns.quantity))
                .ok_or_else(|| invalid(format!("{COL_QUANTITY} is not a number")))?;
            if !(quantity.is_finite() && quantity > 0.0) {
                return Err(invalid(format!("{COL_QUANTITY} must be positive, got {quantity}")));
            }

            let buy_price = parse_number(cell(columns.buy_price))
                .ok_or_else(|| invalid(format!("{COL_BUY_PRICE} is not a number")))?;
            if !(buy_price.is_finite() && buy_price > 0.0) {
                return Err(invalid(format!("{COL_BUY_PRICE} must be positive, got {buy_price}")));
            }

            let buy_date = parse_date(cell(columns.buy_date))
                .ok_or_else(|| invalid(format!("{COL_BUY_DATE} is not a recognizable date")))?;

            holdings.push(Holding::new(symbol, quantity, buy_price, buy_date));
        }

        tracing::info!(count = holdings.len(), "holdings parsed");
        Ok(holdings)
    }

    fn resolve_columns(headers: &[String]) -> Result<ColumnIndex, CoreError> {
        let keys: Vec<String> = headers.iter().map(|h| header_key(h)).collect();
        let find = |name: &str| keys.iter().position(|k| *k == header_key(name));

        let found = [
            (COL_SYMBOL, find(COL_SYMBOL)),
            (COL_QUANTITY, find(COL_QUANTITY)),
            (COL_BUY_PRICE, find(COL_BUY_PRICE)),
            (COL_BUY_DATE, find(COL_BUY_DATE)),
        ];
        let missing: Vec<&str> = found
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| *name)
            .collect();

        match found {
            [(_, Some(symbol)), (_, Some(quantity)), (_, Some(buy_price)), (_, Some(buy_date))] => {
                Ok(ColumnIndex {
                    symbol,
                    quantity,
                    buy_price,
                    buy_date,
                })
            }
            _ => Err(CoreError::Schema(missing.join(", "))),
        }
    }
}

fn header_key(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(_) => data.as_date().map(Cell::Date).unwrap_or(Cell::Empty),
        other => Cell::Text(other.to_string()),
    }
}

/// Parse a numeric cell, tolerating thousands separators and a currency sign.
fn parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches(['$', '₹', '€', '£'])
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse().ok()
        }
        _ => None,
    }
}

fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => {
            let s = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                        .map(|dt| dt.date())
                })
        }
        Cell::Empty => None,
    }
}

/// Excel stores dates as days since 1899-12-30 (accounting for its 1900 leap-year bug).
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}
