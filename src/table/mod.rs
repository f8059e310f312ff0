//! Create and manipulate the row-based [Table] behind the linelist export and
//! console display.

#[cfg(test)]
mod tests;

use crate::utils;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A row-based table of owned string values.
///
/// # Examples
///
/// ```
/// use seqsift::Table;
///
/// let mut table = Table::new();
/// table.headers = vec!["1".to_string(), "2".to_string(), "3".to_string()];
/// table.add_row(vec!["A".to_string(), "B".to_string(), "C".to_string()]).unwrap();
///
/// println!("{}", table.to_markdown().unwrap());
/// ```
///
/// | 1 | 2 | 3 |
/// |---|---|---|
/// | A | B | C |
///
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Table {
    /// Names of the table columns.
    pub headers: Vec<String>,
    /// Rows of table values.
    pub rows: Vec<Vec<String>>,
    /// Optional file path for where the table was read from.
    pub path: Option<PathBuf>,
}

impl Table {
    /// Create a new table with empty headers and rows.
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new(), path: None }
    }

    /// Add a new row to the table.
    pub fn add_row(&mut self, row: Vec<String>) -> Result<(), Report> {
        let new = row.len();
        let ex = self.headers.len();
        if ex != new {
            return Err(eyre!("New row size ({new}) does not match the headers ({ex})."));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Get the column index (0-based) corresponding to the header.
    pub fn header_index(&self, header: &str) -> Result<usize, Report> {
        self.headers.iter().position(|h| h == header).ok_or_else(|| {
            eyre!("Column '{header}' was not found in table: {:?}.", self.path)
        })
    }

    /// Get the table value at a particular column and row index.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqsift::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1".to_string(), "2".to_string()];
    /// table.add_row(vec!["A".to_string(), "B".to_string()]).unwrap();
    ///
    /// assert_eq!("B", table.get("2", 0).unwrap());
    /// ```
    pub fn get(&self, header: &str, row: usize) -> Result<&str, Report> {
        let header_i = self.header_index(header)?;
        let row = self
            .rows
            .get(row)
            .ok_or_else(|| eyre!("Row ({row}) does not exist in the table."))?;
        Ok(&row[header_i])
    }

    /// Return a vector of the table values in a column.
    pub fn get_column(&self, header: &str) -> Result<Vec<&str>, Report> {
        let header_i = self.header_index(header)?;
        let column = self.rows.iter().map(|row| row[header_i].as_str()).collect_vec();
        Ok(column)
    }

    /// Update the value at a particular column and row index.
    pub fn set(&mut self, header: &str, row: usize, value: &str) -> Result<(), Report> {
        let header_i = self.header_index(header)?;
        if row >= self.rows.len() {
            return Err(eyre!("Row ({row}) does not exist in the table."));
        }
        self.rows[row][header_i] = value.to_string();
        Ok(())
    }

    /// Read a TSV or CSV file into a table.
    ///
    /// The delimiter is identified from the path suffix unless provided.
    pub fn read(path: &Path, delim: Option<char>) -> Result<Table, Report> {
        let delim = match delim {
            Some(c) => c,
            None => utils::path_to_delim(path)?,
        };

        let file = File::open(path).wrap_err_with(|| eyre!("Failed to read file: {path:?}"))?;

        let mut table = Table::new();
        for line in BufReader::new(file).lines() {
            let line = line.wrap_err_with(|| eyre!("Failed to read line: {path:?}"))?;
            let row = line.split(delim).map(String::from).collect_vec();
            // the first line holds the headers
            if table.headers.is_empty() {
                table.headers = row;
            } else {
                table.rows.push(row);
            }
        }
        table.path = Some(path.to_path_buf());

        Ok(table)
    }

    /// Write the table to a TSV or CSV file.
    pub fn write(&self, path: &Path, delim: Option<char>) -> Result<(), Report> {
        let delim = match delim {
            Some(c) => c,
            None => utils::path_to_delim(path)?,
        };
        let delim = delim.to_string();

        let mut file =
            File::create(path).wrap_err_with(|| eyre!("Unable to create file: {path:?}"))?;

        let line = format!("{}\n", self.headers.iter().join(&delim));
        file.write_all(line.as_bytes())
            .wrap_err_with(|| eyre!("Unable to write table headers: {line}"))?;

        for row in &self.rows {
            let line = format!("{}\n", row.iter().join(&delim));
            file.write_all(line.as_bytes())
                .wrap_err_with(|| eyre!("Unable to write table row: {line}"))?;
        }

        Ok(())
    }

    /// Convert the table to markdown format.
    pub fn to_markdown(&self) -> Result<String, Report> {
        // maximum width of each column, +2 for a space on either side
        let col_widths = self
            .headers
            .iter()
            .enumerate()
            .map(|(col_i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[col_i].len())
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or_default()
                    + 2
            })
            .collect_vec();

        let mut markdown = String::from("|");
        // frame in between headers and rows
        let mut header_frame = String::from("|");

        for (header, col_width) in self.headers.iter().zip(col_widths.iter()) {
            let cell = format!("{:^width$}|", header, width = col_width);
            markdown.push_str(&cell);

            let frame = format!("{}|", "-".repeat(*col_width));
            header_frame.push_str(&frame);
        }
        markdown.push('\n');
        markdown.push_str(&header_frame);
        markdown.push('\n');

        for row in &self.rows {
            markdown.push('|');
            for (col_i, col_width) in col_widths.iter().enumerate() {
                let cell = format!("{:^width$}|", row[col_i], width = col_width);
                markdown.push_str(&cell);
            }
            markdown.push('\n');
        }

        Ok(markdown)
    }
}
