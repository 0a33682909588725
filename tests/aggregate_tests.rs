// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use monthcast::{Error, LoadOptions, MonthDayYear, Stage, aggregate, aggregate_with};
use rust_decimal::Decimal;
use std::io::Write;
use std::str::FromStr;
use tempfile::NamedTempFile;

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn ten_daily_rows_across_two_months() -> anyhow::Result<()> {
    let mut body = String::from("Date,Amount\n");
    let june = ["10.00", "20.50", "-5.25", "7.75", "100.00"];
    let july = ["1.10", "2.20", "3.30", "4.40", "5.50"];
    for (i, a) in june.iter().enumerate() {
        body.push_str(&format!("06/{:02}/2024,{}\n", 26 + i, a));
    }
    for (i, a) in july.iter().enumerate() {
        body.push_str(&format!("7/{}/2024,{}\n", 1 + i, a));
    }
    let file = csv_file(&body);

    let series = aggregate(file.path(), true, b',')?;
    assert_eq!(series.len(), 2);
    let rows: Vec<_> = series.iter().map(|t| (t.month, t.amount)).collect();
    assert_eq!(
        rows,
        vec![
            (NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), dec("133.00")),
            (NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), dec("16.50")),
        ]
    );
    Ok(())
}

#[test]
fn headerless_semicolon_file() -> anyhow::Result<()> {
    let file = csv_file("01/05/2023;12.5\n01/06/2023;7.5\n02/01/2023;3\n");
    let series = aggregate(file.path(), false, b';')?;
    let amounts: Vec<_> = series.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![dec("20.0"), dec("3")]);
    Ok(())
}

#[test]
fn months_come_out_ascending_whatever_the_row_order() -> anyhow::Result<()> {
    let file = csv_file("Date,Amount\n03/01/2024,1\n01/01/2023,1\n12/31/2023,1\n03/15/2024,1\n");
    let series = aggregate(file.path(), true, b',')?;
    let months: Vec<_> = series.months().map(|m| m.format("%Y-%m").to_string()).collect();
    assert_eq!(months, vec!["2023-01", "2023-12", "2024-03"]);
    assert_eq!(series.last().unwrap().amount, dec("2"));
    Ok(())
}

#[test]
fn extra_columns_and_padding_are_ignored() -> anyhow::Result<()> {
    let file = csv_file("Payee, Date ,Amount,Note\nShop, 02/03/2025 , -20.00 ,memo\n");
    let series = aggregate_with(file.path(), &LoadOptions::default(), &MonthDayYear)?;
    assert_eq!(series.len(), 1);
    assert_eq!(series.first().unwrap().amount, dec("-20.00"));
    Ok(())
}

#[test]
fn malformed_date_is_a_parse_error() {
    let file = csv_file("Date,Amount\n07/04/2024,1\n2024-07-05,2\n");
    let err = aggregate(file.path(), true, b',').unwrap_err();
    assert_eq!(err.stage(), Stage::Parse);
    match err {
        Error::Parse {
            line, field, value, ..
        } => {
            assert_eq!(line, 3);
            assert_eq!(field, "Date");
            assert_eq!(value, "2024-07-05");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn non_numeric_amount_is_a_parse_error() {
    let file = csv_file("Date,Amount\n07/04/2024,twelve\n");
    let err = aggregate(file.path(), true, b',').unwrap_err();
    assert!(matches!(err, Error::Parse { field: "Amount", .. }));
}

#[test]
fn missing_column_is_a_schema_error() {
    let file = csv_file("Date,Value\n07/04/2024,1\n");
    let err = aggregate(file.path(), true, b',').unwrap_err();
    assert_eq!(err.stage(), Stage::Load);
    assert!(matches!(err, Error::Schema { column: "Amount", .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    let err = aggregate(&path, true, b',').unwrap_err();
    match err {
        Error::Io { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn invalid_utf8_row_is_a_csv_error() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"Date,Amount\n01/05/2024,10\n01/06/2024,\xff\xfe\n")?;
    file.flush()?;
    let err = aggregate(file.path(), true, b',').unwrap_err();
    assert!(matches!(err, Error::Csv(_)), "got {err:?}");
    assert_eq!(err.stage(), Stage::Parse);
    Ok(())
}

#[test]
fn header_only_file_gives_empty_series() -> anyhow::Result<()> {
    let file = csv_file("Date,Amount\n");
    let series = aggregate(file.path(), true, b',')?;
    assert!(series.is_empty());
    Ok(())
}

#[test]
fn file_is_not_modified() -> anyhow::Result<()> {
    let contents = "Date,Amount\n01/02/2024,5\n";
    let file = csv_file(contents);
    aggregate(file.path(), true, b',')?;
    assert_eq!(std::fs::read_to_string(file.path())?, contents);
    Ok(())
}
