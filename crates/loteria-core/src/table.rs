//! Tabular view of a [`GameResult`], ready for a spreadsheet encoder.
//!
//! One leading `Jogo` column holds the 1-based game index, followed by one
//! column per number position. Ragged results are padded with blank cells so
//! every row is exactly as wide as the header.

use serde_json::Value;

use crate::result::GameResult;

pub const GAME_HEADER: &str = "Jogo";
pub const GAME_KEY: &str = "game";

const GAME_WIDTH: f64 = 10.0;
const NUMBER_WIDTH: f64 = 15.0;

/// Column schema entry handed to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub header: String,
    pub key: String,
    pub width: f64,
}

/// A single exported game.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    /// Position in reply order, starting at 1. Not derived from the game key.
    pub game_index: usize,
    /// Exactly `max_len` cells; `None` is a blank.
    pub numbers: Vec<Option<Value>>,
}

impl ExportRow {
    /// Cell count including the game index column.
    pub fn width(&self) -> usize {
        self.numbers.len() + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<ExportRow>,
}

impl ExportTable {
    pub fn from_result(result: &GameResult) -> Self {
        let max_len = result.max_len();

        let mut columns = Vec::with_capacity(max_len + 1);
        columns.push(ColumnSpec {
            header: GAME_HEADER.to_string(),
            key: GAME_KEY.to_string(),
            width: GAME_WIDTH,
        });
        columns.extend((1..=max_len).map(|n| ColumnSpec {
            header: number_header(n),
            key: format!("number_{n}"),
            width: NUMBER_WIDTH,
        }));

        let rows = result
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let mut numbers: Vec<Option<Value>> =
                    entry.numbers.iter().cloned().map(Some).collect();
                numbers.resize(max_len, None);
                ExportRow {
                    game_index: i + 1,
                    numbers,
                }
            })
            .collect();

        Self { columns, rows }
    }

    /// Number of number-position columns.
    pub fn max_len(&self) -> usize {
        self.columns.len() - 1
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }
}

/// Ordinal header for number position `n` (1-based): `1º Número`.
pub fn number_header(n: usize) -> String {
    format!("{n}º Número")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::normalize;
    use serde_json::json;

    #[test]
    fn single_game_table() {
        let result = normalize("```json\n{\"game1\":[1,2,3]}\n```").unwrap();
        let table = ExportTable::from_result(&result);

        let headers: Vec<&str> = table.headers().collect();
        assert_eq!(headers, ["Jogo", "1º Número", "2º Número", "3º Número"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].game_index, 1);
        assert_eq!(
            table.rows[0].numbers,
            vec![Some(json!(1)), Some(json!(2)), Some(json!(3))]
        );
    }

    #[test]
    fn ragged_rows_are_padded_with_blanks() {
        let result = normalize(r#"{"game1":[1,2,3], "game2":[4,5]}"#).unwrap();
        let table = ExportTable::from_result(&result);

        assert_eq!(table.max_len(), 3);
        assert_eq!(table.rows[1].game_index, 2);
        assert_eq!(
            table.rows[1].numbers,
            vec![Some(json!(4)), Some(json!(5)), None]
        );
        for row in &table.rows {
            assert_eq!(row.width(), table.max_len() + 1);
        }
    }

    #[test]
    fn game_index_follows_reply_order_not_key() {
        let result = normalize(r#"{"game7":[1], "game3":[2], "other":[3,4]}"#).unwrap();
        let table = ExportTable::from_result(&result);

        let indexes: Vec<usize> = table.rows.iter().map(|r| r.game_index).collect();
        assert_eq!(indexes, [1, 2, 3]);
        assert_eq!(table.rows[0].numbers, vec![Some(json!(1)), None]);
    }

    #[test]
    fn empty_result_is_header_only() {
        let table = ExportTable::from_result(&GameResult::default());
        assert_eq!(table.max_len(), 0);
        assert!(table.rows.is_empty());
        assert_eq!(table.headers().collect::<Vec<_>>(), ["Jogo"]);
    }

    #[test]
    fn column_keys_and_widths() {
        let result = normalize(r#"{"game1":[1,2]}"#).unwrap();
        let table = ExportTable::from_result(&result);

        let keys: Vec<&str> = table.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["game", "number_1", "number_2"]);
        assert_eq!(table.columns[0].width, 10.0);
        assert_eq!(table.columns[1].width, 15.0);
    }
}
