// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Loading dated transactions from delimited text and totalling them by
//! calendar month.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{MonthlySeries, MonthlyTotal, Transaction};
use crate::utils::{month_start, parse_decimal, parse_mdy_date};

pub const DATE_COLUMN: &str = "Date";
pub const AMOUNT_COLUMN: &str = "Amount";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Row 1 names the columns. Without a header, `Date` is the first
    /// column and `Amount` the second.
    pub has_header: bool,
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
        }
    }
}

impl LoadOptions {
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Turns the raw text of a `Date` field into a calendar date. `Err` carries
/// the reason the value was rejected.
pub trait DateParser {
    fn parse_date(&self, raw: &str) -> std::result::Result<NaiveDate, String>;
}

/// Month/day/year, e.g. `07/04/2024` or `7/4/2024`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthDayYear;

impl DateParser for MonthDayYear {
    fn parse_date(&self, raw: &str) -> std::result::Result<NaiveDate, String> {
        parse_mdy_date(raw)
    }
}

impl<F> DateParser for F
where
    F: Fn(&str) -> std::result::Result<NaiveDate, String>,
{
    fn parse_date(&self, raw: &str) -> std::result::Result<NaiveDate, String> {
        self(raw)
    }
}

/// Loads `path` and returns one total per month present, ascending.
pub fn aggregate(path: impl AsRef<Path>, has_header: bool, delimiter: u8) -> Result<MonthlySeries> {
    let options = LoadOptions {
        has_header,
        delimiter,
    };
    aggregate_with(path, &options, &MonthDayYear)
}

pub fn aggregate_with(
    path: impl AsRef<Path>,
    options: &LoadOptions,
    parser: &dyn DateParser,
) -> Result<MonthlySeries> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let txs = load(file, options, parser, path)?;
    group_by_month(&txs)
}

pub fn aggregate_reader<R: Read>(
    reader: R,
    options: &LoadOptions,
    parser: &dyn DateParser,
) -> Result<MonthlySeries> {
    let txs = read_transactions(reader, options, parser)?;
    group_by_month(&txs)
}

pub fn read_transactions<R: Read>(
    reader: R,
    options: &LoadOptions,
    parser: &dyn DateParser,
) -> Result<Vec<Transaction>> {
    load(reader, options, parser, Path::new("<reader>"))
}

/// Sums amounts per month. Every month present in `txs` appears exactly
/// once in the result.
pub fn group_by_month(txs: &[Transaction]) -> Result<MonthlySeries> {
    let mut by_month: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for tx in txs {
        let month = month_start(tx.date);
        let total = by_month.entry(month).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(tx.amount)
            .ok_or(Error::Overflow { month })?;
    }
    debug!(rows = txs.len(), months = by_month.len(), "grouped transactions by month");
    let totals = by_month
        .into_iter()
        .map(|(month, amount)| MonthlyTotal { month, amount })
        .collect();
    Ok(MonthlySeries::from_sorted(totals))
}

fn load<R: Read>(
    reader: R,
    options: &LoadOptions,
    parser: &dyn DateParser,
    origin: &Path,
) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let (date_idx, amount_idx) = if options.has_header {
        let headers = rdr.headers().map_err(|e| csv_failure(e, origin))?;
        (
            column_index(headers, DATE_COLUMN)?,
            column_index(headers, AMOUNT_COLUMN)?,
        )
    } else {
        (0, 1)
    };

    let mut txs = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let rec = result.map_err(|e| csv_failure(e, origin))?;
        let line = rec
            .position()
            .map(|p| p.line())
            .unwrap_or(i as u64 + 1 + u64::from(options.has_header));

        let date_raw = field(&rec, date_idx, DATE_COLUMN, line)?;
        let amount_raw = field(&rec, amount_idx, AMOUNT_COLUMN, line)?;

        let date = parser.parse_date(date_raw).map_err(|reason| Error::Parse {
            line,
            field: DATE_COLUMN,
            value: date_raw.to_string(),
            reason,
        })?;
        let amount = parse_decimal(amount_raw).map_err(|reason| Error::Parse {
            line,
            field: AMOUNT_COLUMN,
            value: amount_raw.to_string(),
            reason,
        })?;
        txs.push(Transaction { date, amount });
    }
    debug!(origin = %origin.display(), rows = txs.len(), "read transactions");
    Ok(txs)
}

fn column_index(headers: &StringRecord, column: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or(Error::Schema { column, line: None })
}

fn field<'r>(
    rec: &'r StringRecord,
    idx: usize,
    column: &'static str,
    line: u64,
) -> Result<&'r str> {
    rec.get(idx).ok_or(Error::Schema {
        column,
        line: Some(line),
    })
}

fn csv_failure(err: csv::Error, origin: &Path) -> Error {
    if err.is_io_error() {
        return Error::Io {
            path: origin.to_path_buf(),
            source: err.into(),
        };
    }
    Error::Csv(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn groups_and_orders_months() {
        let data = "Date,Amount\n03/02/2024,5\n01/15/2024,10.5\n01/20/2024,-0.5\n";
        let s = aggregate_reader(data.as_bytes(), &LoadOptions::default(), &MonthDayYear).unwrap();
        let rows: Vec<_> = s.iter().map(|t| (t.month, t.amount)).collect();
        assert_eq!(
            rows,
            vec![
                (d(2024, 1, 1), Decimal::new(10, 0)),
                (d(2024, 3, 1), Decimal::new(5, 0)),
            ]
        );
    }

    #[test]
    fn columns_found_by_name_in_any_order() {
        let data = "Memo,Amount,Date\ncoffee,3.25,02/01/2024\n";
        let txs =
            read_transactions(data.as_bytes(), &LoadOptions::default(), &MonthDayYear).unwrap();
        assert_eq!(
            txs,
            vec![Transaction {
                date: d(2024, 2, 1),
                amount: Decimal::new(325, 2),
            }]
        );
    }

    #[test]
    fn header_names_are_case_sensitive() {
        let data = "date,amount\n02/01/2024,1\n";
        let err = read_transactions(data.as_bytes(), &LoadOptions::default(), &MonthDayYear)
            .unwrap_err();
        assert!(matches!(err, Error::Schema { column: "Date", line: None }));
    }

    #[test]
    fn short_row_is_a_schema_error_with_line() {
        let data = "Date,Amount\n02/01/2024,1\n02/02/2024\n";
        let err = read_transactions(data.as_bytes(), &LoadOptions::default(), &MonthDayYear)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema {
                column: "Amount",
                line: Some(3)
            }
        ));
    }

    #[test]
    fn bad_amount_reports_line_and_value() {
        let data = "Date,Amount\n02/01/2024,1\n02/02/2024,abc\n";
        let err = read_transactions(data.as_bytes(), &LoadOptions::default(), &MonthDayYear)
            .unwrap_err();
        match err {
            Error::Parse {
                line, field, value, ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(field, "Amount");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn injected_parser_is_used() {
        let iso = |raw: &str| NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| e.to_string());
        let data = "Date,Amount\n2024-05-31,2\n2024-06-01,3\n";
        let s = aggregate_reader(data.as_bytes(), &LoadOptions::default(), &iso).unwrap();
        assert_eq!(s.len(), 2);
    }

    struct Unreadable;

    impl Read for Unreadable {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device went away"))
        }
    }

    #[test]
    fn reader_failure_is_an_io_error() {
        let err = read_transactions(Unreadable, &LoadOptions::default(), &MonthDayYear)
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "got {err:?}");
        assert_eq!(err.stage(), crate::error::Stage::Load);
    }

    #[test]
    fn overflow_is_reported() {
        let txs = vec![
            Transaction {
                date: d(2024, 1, 1),
                amount: Decimal::MAX,
            },
            Transaction {
                date: d(2024, 1, 2),
                amount: Decimal::MAX,
            },
        ];
        let err = group_by_month(&txs).unwrap_err();
        assert!(matches!(err, Error::Overflow { month } if month == d(2024, 1, 1)));
    }
}
