// Draftable-player table: column schema and the sort toggle.

use std::borrow::Borrow;
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::draft::model::Player;

// ---------------------------------------------------------------------------
// Stat schema
// ---------------------------------------------------------------------------

/// Display metadata for one raw stat key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatColumn {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Abbreviation")]
    pub abbreviation: String,
}

impl StatColumn {
    pub fn new(key: &str, label: &str, abbreviation: &str) -> Self {
        StatColumn {
            key: key.to_string(),
            label: label.to_string(),
            abbreviation: abbreviation.to_string(),
        }
    }
}

/// Ordered mapping from raw stat keys to labels, supplied by the roster
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatSchema {
    pub columns: Vec<StatColumn>,
}

impl StatSchema {
    /// Labels for the football roster served by the reference league server.
    pub fn football() -> Self {
        let columns = [
            ("Name", "Name", "Name"),
            ("Position", "Position", "Pos"),
            ("Team", "Team", "Team"),
            ("Age", "Age", "Age"),
            ("Games", "Games", "GP"),
            ("Starts", "Starts", "GS"),
            ("PassCompletions", "Pass Completions", "Comp"),
            ("PassAttempts", "Pass Attempts", "Att"),
            ("PassYards", "Pass Yards", "Yd"),
            ("PassTouchdowns", "Pass Touchdowns", "Td"),
            ("PassInterceptions", "Pass Interceptions", "Int"),
            ("RushAttempts", "Rush Attempts", "Att"),
            ("RushYards", "Rush Yards", "Yd"),
            ("RushTouchdowns", "Rush Touchdowns", "Td"),
            ("Targets", "Targets", "Tar"),
            ("Receptions", "Receptions", "Rec"),
            ("ReceivingYards", "Receiving Yards", "Yd"),
            ("ReceivingTouchdowns", "Receiving Touchdowns", "Td"),
            ("Fumbles", "Fumbles", "Fmb"),
            ("FumblesLost", "Fumbles Lost", "FmbL"),
            ("AllTouchdowns", "All Touchdowns", "Td"),
            ("TwoPointConversion", "Two Point Conversion", "Tpc"),
            ("TwoPointPass", "Two Point Pass", "Tpp"),
            ("FantasyPoints", "Fantasy Points", "Fp"),
            ("PointPerReception", "Point Per Reception", "Ppr"),
            ("ValueBased", "Value Based", "Vbd"),
        ];
        StatSchema {
            columns: columns
                .iter()
                .map(|(k, l, a)| StatColumn::new(k, l, a))
                .collect(),
        }
    }

    pub fn column(&self, key: &str) -> Option<&StatColumn> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Label for a key; keys missing from the schema show verbatim.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.column(key).map(|c| c.label.as_str()).unwrap_or(key)
    }

    pub fn abbreviation<'a>(&'a self, key: &'a str) -> &'a str {
        self.column(key)
            .map(|c| c.abbreviation.as_str())
            .unwrap_or(key)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Alphabetic,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// What the last toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortApplied {
    pub column: String,
    pub kind: ColumnKind,
    pub direction: SortDirection,
}

/// Toggles the sort order of the player table one column at a time.
///
/// Only the most recently sorted column is remembered: activating it again
/// flips the order and clears the marker, activating any other column starts
/// fresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolSorter {
    last_sorted: Option<String>,
}

impl PoolSorter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_sorted(&self) -> Option<&str> {
        self.last_sorted.as_deref()
    }

    /// Sort `rows` by `column`. Returns `None` (rows untouched) when the
    /// table is empty or the first row has no such column.
    pub fn toggle<P: Borrow<Player>>(&mut self, rows: &mut [P], column: &str) -> Option<SortApplied> {
        let sample = rows.first()?.borrow().cell(column)?;
        let kind = column_kind(&sample);
        let repeat = self.last_sorted.as_deref() == Some(column);

        let direction = match (kind, repeat) {
            (ColumnKind::Alphabetic, false) => SortDirection::Ascending,
            (ColumnKind::Alphabetic, true) => SortDirection::Descending,
            (ColumnKind::Numeric, false) => SortDirection::Descending,
            (ColumnKind::Numeric, true) => SortDirection::Ascending,
        };
        self.last_sorted = if repeat {
            None
        } else {
            Some(column.to_string())
        };

        let applied = SortApplied {
            column: column.to_string(),
            kind,
            direction,
        };
        sort_rows(rows, &applied);
        Some(applied)
    }
}

/// Sort `rows` the way `applied` describes without touching any toggle
/// state. Used to keep a sorted table sorted after it is rebuilt.
pub fn sort_rows<P: Borrow<Player>>(rows: &mut [P], applied: &SortApplied) {
    let column = applied.column.as_str();
    let direction = applied.direction;
    match applied.kind {
        ColumnKind::Alphabetic => rows.sort_by(|a, b| {
            let ord = locale_compare(
                &cell_text(a.borrow(), column),
                &cell_text(b.borrow(), column),
            );
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }),
        ColumnKind::Numeric => rows.sort_by(|a, b| {
            numeric_compare(
                a.borrow().stat_f64(column),
                b.borrow().stat_f64(column),
                direction,
            )
        }),
    }
}

/// JavaScript-style stringification of a cell.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_text(player: &Player, column: &str) -> String {
    player
        .cell(column)
        .map(|v| stringify(&v))
        .unwrap_or_default()
}

/// A column is alphabetic when its stringified, lowercased value starts with
/// a Latin letter.
pub fn column_kind(value: &Value) -> ColumnKind {
    let first = stringify(value).to_lowercase().chars().next();
    match first {
        Some(c) if c.is_ascii_lowercase() => ColumnKind::Alphabetic,
        _ => ColumnKind::Numeric,
    }
}

/// Case-insensitive ordering with a case-sensitive tie-break, so "alpha"
/// sorts next to "Alpha" rather than after every capitalised word.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Missing or non-numeric cells sort last in either direction.
fn numeric_compare(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::model::fixtures::player;

    fn names(rows: &[Player]) -> Vec<&str> {
        rows.iter().map(|p| p.name.as_str()).collect()
    }

    fn points(rows: &[Player]) -> Vec<f64> {
        rows.iter()
            .filter_map(|p| p.stat_f64("FantasyPoints"))
            .collect()
    }

    fn greek() -> Vec<Player> {
        vec![
            player(1, "Zeta", "QB", 10),
            player(2, "Alpha", "RB", 30),
            player(3, "Mu", "WR", 20),
        ]
    }

    #[test]
    fn alphabetic_toggle_cycle() {
        let mut rows = greek();
        let mut sorter = PoolSorter::new();

        let applied = sorter.toggle(&mut rows, "Name").unwrap();
        assert_eq!(applied.kind, ColumnKind::Alphabetic);
        assert_eq!(applied.direction, SortDirection::Ascending);
        assert_eq!(names(&rows), vec!["Alpha", "Mu", "Zeta"]);
        assert_eq!(sorter.last_sorted(), Some("Name"));

        sorter.toggle(&mut rows, "Name").unwrap();
        assert_eq!(names(&rows), vec!["Zeta", "Mu", "Alpha"]);
        assert_eq!(sorter.last_sorted(), None);

        sorter.toggle(&mut rows, "Name").unwrap();
        assert_eq!(names(&rows), vec!["Alpha", "Mu", "Zeta"]);
    }

    #[test]
    fn numeric_column_sorts_descending_first() {
        let mut rows = greek();
        let mut sorter = PoolSorter::new();

        let applied = sorter.toggle(&mut rows, "FantasyPoints").unwrap();
        assert_eq!(applied.kind, ColumnKind::Numeric);
        assert_eq!(points(&rows), vec![30.0, 20.0, 10.0]);

        let applied = sorter.toggle(&mut rows, "FantasyPoints").unwrap();
        assert_eq!(applied.direction, SortDirection::Ascending);
        assert_eq!(points(&rows), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn switching_columns_resets_toggle() {
        let mut rows = greek();
        let mut sorter = PoolSorter::new();
        sorter.toggle(&mut rows, "Name").unwrap();
        sorter.toggle(&mut rows, "FantasyPoints").unwrap();
        let applied = sorter.toggle(&mut rows, "Name").unwrap();
        assert_eq!(applied.direction, SortDirection::Ascending);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut rows = vec![
            player(1, "First", "RB", 10),
            player(2, "Second", "QB", 10),
            player(3, "Third", "RB", 10),
        ];
        PoolSorter::new().toggle(&mut rows, "FantasyPoints").unwrap();
        assert_eq!(names(&rows), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn locale_compare_ignores_case_first() {
        let mut rows = vec![
            player(1, "bravo", "RB", 1),
            player(2, "Alpha", "RB", 1),
            player(3, "Charlie", "RB", 1),
        ];
        PoolSorter::new().toggle(&mut rows, "Name").unwrap();
        assert_eq!(names(&rows), vec!["Alpha", "bravo", "Charlie"]);
    }

    #[test]
    fn kind_is_inferred_from_first_row() {
        assert_eq!(column_kind(&Value::from("RB")), ColumnKind::Alphabetic);
        assert_eq!(column_kind(&Value::from(12)), ColumnKind::Numeric);
        assert_eq!(column_kind(&Value::from("49ers")), ColumnKind::Numeric);
        assert_eq!(column_kind(&Value::from(-3.5)), ColumnKind::Numeric);
    }

    #[test]
    fn missing_numbers_sort_last() {
        let mut rows = greek();
        rows[1].stats.remove("FantasyPoints");
        let mut sorter = PoolSorter::new();
        sorter.toggle(&mut rows, "FantasyPoints").unwrap();
        assert_eq!(names(&rows), vec!["Mu", "Zeta", "Alpha"]);
        sorter.toggle(&mut rows, "FantasyPoints").unwrap();
        assert_eq!(names(&rows), vec!["Zeta", "Mu", "Alpha"]);
    }

    #[test]
    fn unknown_column_is_a_no_op() {
        let mut rows = greek();
        let mut sorter = PoolSorter::new();
        assert!(sorter.toggle(&mut rows, "Nope").is_none());
        assert!(sorter.toggle(&mut Vec::<Player>::new(), "Name").is_none());
        assert_eq!(names(&rows), vec!["Zeta", "Alpha", "Mu"]);
        assert_eq!(sorter.last_sorted(), None);
    }

    #[test]
    fn sort_rows_reapplies_without_toggling() {
        let mut rows = greek();
        let mut sorter = PoolSorter::new();
        let applied = sorter.toggle(&mut rows, "Name").unwrap();

        let mut rebuilt = greek();
        sort_rows(&mut rebuilt, &applied);
        assert_eq!(names(&rebuilt), vec!["Alpha", "Mu", "Zeta"]);
        assert_eq!(sorter.last_sorted(), Some("Name"));
    }

    #[test]
    fn sorts_shared_rows() {
        let mut rows: Vec<std::sync::Arc<Player>> =
            greek().into_iter().map(std::sync::Arc::new).collect();
        PoolSorter::new().toggle(&mut rows, "Name").unwrap();
        assert_eq!(rows[0].name, "Alpha");
    }

    #[test]
    fn schema_labels_fall_back_to_raw_key() {
        let schema = StatSchema::football();
        assert_eq!(schema.label("PassYards"), "Pass Yards");
        assert_eq!(schema.abbreviation("ValueBased"), "Vbd");
        assert_eq!(schema.label("Tackles"), "Tackles");
    }

    #[test]
    fn schema_deserializes_from_list() {
        let schema: StatSchema = serde_json::from_str(
            r#"[{"Key":"Goals","Label":"Goals Scored","Abbreviation":"G"}]"#,
        )
        .unwrap();
        assert_eq!(schema.abbreviation("Goals"), "G");
    }
}
