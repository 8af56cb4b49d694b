//! Parses transactions from CSV files with a header row.
//!
//! The header must name the `date`, `amount` and `memo` columns, `category` is
//! optional. Column names are matched case-insensitively and in any order.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, NewTransaction, Transaction};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

const DATE_COLUMNS: &[&str] = &["date"];
const AMOUNT_COLUMNS: &[&str] = &["amount"];
const MEMO_COLUMNS: &[&str] = &["memo", "description"];
const CATEGORY_COLUMNS: &[&str] = &["category", "categ"];

/// The positions of the known columns in a record.
#[derive(Debug, PartialEq)]
struct Columns {
    date: usize,
    amount: usize,
    memo: usize,
    category: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, Error> {
        let find = |names: &[&str]| {
            headers.iter().position(|header| {
                let header = header.trim_start_matches('\u{feff}').trim();
                names.iter().any(|name| header.eq_ignore_ascii_case(name))
            })
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| {
                Error::InvalidCSV(format!(
                    "the header row on line 1 is missing the \"{}\" column",
                    names[0]
                ))
            })
        };

        Ok(Self {
            date: require(DATE_COLUMNS)?,
            amount: require(AMOUNT_COLUMNS)?,
            memo: require(MEMO_COLUMNS)?,
            category: find(CATEGORY_COLUMNS),
        })
    }
}

/// Parses the transactions in `text`, a CSV document with a header row.
///
/// Every row gets an import ID, so the store skips rows that were loaded
/// before when the same file is imported twice.
///
/// # Errors
/// Returns [Error::InvalidCSV] naming the line of the first row that could not
/// be parsed. No transactions are returned in that case.
pub fn parse_csv(text: &str) -> Result<Vec<NewTransaction>, Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(format!("could not read the header row: {error}")))?;
    let columns = Columns::from_headers(headers)?;

    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut transactions = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|error| {
            let line = error.position().map_or(0, |position| position.line());
            Error::InvalidCSV(format!("line {line}: {error}"))
        })?;
        let line = record.position().map_or(0, |position| position.line());

        let date = parse_date(field(&record, columns.date), line)?;
        let amount = parse_amount(field(&record, columns.amount), line)?;
        let memo = field(&record, columns.memo);
        let category = columns
            .category
            .map(|column| field(&record, column))
            .unwrap_or_default();

        let key = format!("{date},{amount},{memo},{category}");
        let occurrence = occurrences.entry(key.clone()).or_insert(0);
        *occurrence += 1;
        let import_id = create_import_id(&format!("{key},{occurrence}"));

        transactions.push(
            Transaction::build(amount, date, memo)
                .category(category)
                .import_id(Some(import_id)),
        );
    }

    tracing::debug!("Parsed {} transactions from CSV", transactions.len());

    Ok(transactions)
}

fn field(record: &StringRecord, column: usize) -> &str {
    record.get(column).unwrap_or_default()
}

fn parse_date(text: &str, line: u64) -> Result<Date, Error> {
    Date::parse(text, DATE_FORMAT).map_err(|error| {
        Error::InvalidCSV(format!(
            "line {line}: could not parse \"{text}\" as a date like 2024-01-31: {error}"
        ))
    })
}

/// Parses amounts like "1234.5", "-$1,234.50" or "$-12".
fn parse_amount(text: &str, line: u64) -> Result<f64, Error> {
    let error = || {
        Error::InvalidCSV(format!(
            "line {line}: could not parse \"{text}\" as an amount of money"
        ))
    };

    let without_separators: String = text.chars().filter(|c| *c != ',').collect();
    let (sign, unsigned) = match without_separators.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, without_separators.as_str()),
    };
    let number = unsigned
        .trim_start_matches(|c: char| !c.is_alphanumeric() && !matches!(c, '.' | '-' | '+'));

    let amount: f64 = number.parse().map_err(|_| error())?;

    if !amount.is_finite() {
        return Err(error());
    }

    Ok(sign * amount)
}

/// Creates a hash identifying a CSV row from its date, amount, memo, category
/// and how many times the same row appeared before it in the file.
pub fn create_import_id(row_key: &str) -> i64 {
    let hash_128 = md5::compute(row_key);
    let mut hash_64 = [0; 8];
    hash_64.copy_from_slice(&hash_128[0..8]);
    i64::from_le_bytes(hash_64)
}
