use crate::table::Table;
use color_eyre::eyre::{Report, Result};
use std::io::Write;
use tempfile::Builder;

fn table() -> Result<Table, Report> {
    let mut table = Table::new();
    table.headers = vec!["1".to_string(), "2".to_string(), "3".to_string()];
    table.add_row(vec!["A".to_string(), "B".to_string(), "C".to_string()])?;
    table.add_row(vec!["D".to_string(), "E".to_string(), "F".to_string()])?;
    Ok(table)
}

#[test]
fn add_row_checks_width() -> Result<(), Report> {
    let mut table = table()?;
    assert!(table.add_row(vec!["G".to_string()]).is_err());
    assert_eq!(2, table.rows.len());
    Ok(())
}

#[test]
fn get_and_set() -> Result<(), Report> {
    let mut table = table()?;
    assert_eq!("E", table.get("2", 1)?);
    assert_eq!(vec!["C", "F"], table.get_column("3")?);

    table.set("2", 1, "EE")?;
    assert_eq!("EE", table.get("2", 1)?);

    assert!(table.get("4", 0).is_err());
    assert!(table.set("1", 9, "X").is_err());
    Ok(())
}

#[test]
fn write_read_round_trip() -> Result<(), Report> {
    let expected = table()?;
    let file = Builder::new().suffix(".tsv").tempfile()?;
    expected.write(file.path(), None)?;

    let observed = Table::read(file.path(), None)?;
    assert_eq!(expected.headers, observed.headers);
    assert_eq!(expected.rows, observed.rows);
    Ok(())
}

#[test]
fn read_with_explicit_delimiter() -> Result<(), Report> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "1;2;3\nA;B;C")?;

    let observed = Table::read(file.path(), Some(';'))?;
    assert_eq!(vec!["1", "2", "3"], observed.headers);
    assert_eq!(vec![vec!["A", "B", "C"]], observed.rows);
    Ok(())
}

#[test]
fn markdown_pads_columns() -> Result<(), Report> {
    let mut table = Table::new();
    table.headers = vec!["name".to_string(), "clade".to_string()];
    table.add_row(vec!["s1".to_string(), "20A".to_string()])?;

    let observed = table.to_markdown()?;
    let expected = "| name | clade |\n|------|-------|\n|  s1  |  20A  |\n";
    assert_eq!(expected, observed);
    Ok(())
}
