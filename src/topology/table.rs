/*!
The link table shown in the window, and the rules for folding a poll result into it.

This module defines:
- `LinkRow`: a displayed link plus bookkeeping (when it was last reported, whether the latest poll still had it).
- `DisplayTable`: the ordered rows, with `merge` as the only way new data gets in.
- `RowRenderer` / `LinkColumn`: the seam to whatever draws the table.
*/

use std::time::SystemTime;

use serde::Serialize;

use crate::parsers::LinkRecord;

/// Columns of the rendered table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkColumn {
    Source,
    Quality,
    Dest,
}

impl LinkColumn {
    pub const ALL: [LinkColumn; 3] = [LinkColumn::Source, LinkColumn::Quality, LinkColumn::Dest];

    pub fn title(self) -> &'static str {
        match self {
            LinkColumn::Source => "Source",
            LinkColumn::Quality => "Quality",
            LinkColumn::Dest => "Dest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRow {
    pub source: String,
    pub dest: String,
    pub quality: String,
    pub last_seen: SystemTime,
    /// The latest successful poll did not report this link.
    pub stale: bool,
}

impl LinkRow {
    fn new(record: LinkRecord, seen: SystemTime) -> Self {
        Self {
            source: record.source,
            dest: record.dest,
            quality: record.quality,
            last_seen: seen,
            stale: false,
        }
    }

    pub fn key_matches(&self, record: &LinkRecord) -> bool {
        self.source == record.source && self.dest == record.dest
    }

    pub fn cell(&self, column: LinkColumn) -> &str {
        match column {
            LinkColumn::Source => &self.source,
            LinkColumn::Quality => &self.quality,
            LinkColumn::Dest => &self.dest,
        }
    }

    /// Cells in column order (source, quality, dest).
    pub fn cells(&self) -> [&str; 3] {
        LinkColumn::ALL.map(|c| self.cell(c))
    }
}

/// Whatever draws the table. Called once per row, top to bottom.
pub trait RowRenderer {
    fn render_row(&mut self, index: usize, row: &LinkRow);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub updated: usize,
    pub appended: usize,
}

impl MergeSummary {
    pub fn total(&self) -> usize {
        self.updated + self.appended
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayTable {
    rows: Vec<LinkRow>,
}

impl DisplayTable {
    /// Fold one poll's records into the table.
    ///
    /// A record whose (source, dest) labels match an existing row overwrites its quality,
    /// anything else is appended. Rows the poll did not mention are kept but flagged stale.
    /// Afterwards the table is stably sorted by source label.
    pub fn merge<I>(&mut self, records: I, seen: SystemTime) -> MergeSummary
    where
        I: IntoIterator<Item = LinkRecord>,
    {
        let mut summary = MergeSummary::default();
        let mut reported = vec![false; self.rows.len()];

        for record in records {
            match self.rows.iter().position(|row| row.key_matches(&record)) {
                Some(i) => {
                    let row = &mut self.rows[i];
                    row.quality = record.quality;
                    row.last_seen = seen;
                    row.stale = false;
                    if let Some(flag) = reported.get_mut(i) {
                        *flag = true;
                    }
                    summary.updated += 1;
                }
                None => {
                    self.rows.push(LinkRow::new(record, seen));
                    summary.appended += 1;
                }
            }
        }

        for (row, was_reported) in self.rows.iter_mut().zip(reported) {
            if !was_reported {
                row.stale = true;
            }
        }

        self.rows.sort_by(|a, b| a.source.cmp(&b.source));
        summary
    }

    pub fn render_into<R: RowRenderer + ?Sized>(&self, renderer: &mut R) {
        for (i, row) in self.rows.iter().enumerate() {
            renderer.render_row(i, row);
        }
    }

    pub fn rows(&self) -> &[LinkRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn rec(s: &str, d: &str, q: &str) -> LinkRecord {
        LinkRecord::new(s, d, q)
    }

    fn t(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn sources(table: &DisplayTable) -> Vec<&str> {
        table.rows().iter().map(|r| r.source.as_str()).collect()
    }

    #[test]
    fn test_same_record_twice_keeps_one_row() {
        let mut table = DisplayTable::default();
        table.merge([rec("A", "B", "0.5")], t(1));
        let summary = table.merge([rec("A", "B", "0.7")], t(2));

        assert_eq!(summary, MergeSummary { updated: 1, appended: 0 });
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].quality, "0.7");
        assert_eq!(table.rows()[0].last_seen, t(2));
    }

    #[test]
    fn test_duplicate_within_one_cycle_last_wins() {
        let mut table = DisplayTable::default();
        let summary = table.merge([rec("A", "B", "0.5"), rec("A", "B", "0.9")], t(1));
        assert_eq!(summary, MergeSummary { updated: 1, appended: 1 });
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].quality, "0.9");
        assert!(!table.rows()[0].stale);
    }

    #[test]
    fn test_sorted_by_source() {
        let mut table = DisplayTable::default();
        table.merge([rec("B", "X", "1.0"), rec("A", "X", "1.0")], t(1));
        assert_eq!(sources(&table), vec!["A", "B"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_sources() {
        let mut table = DisplayTable::default();
        table.merge(
            [rec("B", "Z", "1.0"), rec("A", "Y", "1.0"), rec("B", "C", "1.0")],
            t(1),
        );
        let dests: Vec<_> = table.rows().iter().map(|r| r.dest.as_str()).collect();
        assert_eq!(dests, vec!["Y", "Z", "C"]);
    }

    #[test]
    fn test_direction_matters() {
        let mut table = DisplayTable::default();
        table.merge([rec("A", "B", "1.0"), rec("B", "A", "2.0")], t(1));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_stale_rows_are_kept_and_flagged() {
        let mut table = DisplayTable::default();
        table.merge([rec("A", "B", "1.0"), rec("C", "D", "1.0")], t(1));
        table.merge([rec("C", "D", "0.8")], t(2));

        assert_eq!(table.len(), 2);
        let ab = &table.rows()[0];
        assert_eq!((ab.source.as_str(), ab.stale, ab.last_seen), ("A", true, t(1)));
        let cd = &table.rows()[1];
        assert_eq!((cd.quality.as_str(), cd.stale), ("0.8", false));

        // reported again: no longer stale
        table.merge([rec("A", "B", "0.3")], t(3));
        assert!(!table.rows()[0].stale);
        assert!(table.rows()[1].stale);
    }

    #[test]
    fn test_empty_merge_keeps_rows() {
        let mut table = DisplayTable::default();
        table.merge([rec("A", "B", "1.0")], t(1));
        let summary = table.merge(Vec::new(), t(2));
        assert_eq!(summary.total(), 0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].quality, "1.0");
    }

    #[test]
    fn test_render_column_order() {
        struct Collect(Vec<(usize, [String; 3])>);
        impl RowRenderer for Collect {
            fn render_row(&mut self, index: usize, row: &LinkRow) {
                self.0.push((index, row.cells().map(str::to_string)));
            }
        }

        let mut table = DisplayTable::default();
        table.merge([rec("B", "C", "0.1"), rec("A", "B", "0.2")], t(1));
        let mut out = Collect(Vec::new());
        table.render_into(&mut out);

        assert_eq!(
            out.0,
            vec![
                (0, ["A".to_string(), "0.2".to_string(), "B".to_string()]),
                (1, ["B".to_string(), "0.1".to_string(), "C".to_string()]),
            ]
        );
        assert_eq!(LinkColumn::Dest.title(), "Dest");
    }

    #[test]
    fn test_clear_and_json() {
        let mut table = DisplayTable::default();
        table.merge([rec("A", "B", "1.0")], t(1));
        let json = table.to_json().unwrap();
        assert!(json.contains("\"quality\": \"1.0\""));
        table.clear();
        assert!(table.is_empty());
    }
}
