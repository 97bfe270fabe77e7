//! Tab-separated table replies.

use std::collections::BTreeMap;

use crate::backend::FENCE;

/// One parsed row, keyed by lowercase column name.
pub type Record = BTreeMap<String, String>;

/// A fixed column layout the prompts ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub columns: &'static [&'static str],
}

impl TableLayout {
    /// `FORM LEMMA UPOS FEATS`
    pub const MORPHOSYNTAX: TableLayout = TableLayout {
        columns: &["FORM", "LEMMA", "UPOS", "FEATS"],
    };

    /// `FORM HEAD DEPREL`; HEAD is 1-based within the sentence, 0 = root.
    pub const DEPENDENCY: TableLayout = TableLayout {
        columns: &["FORM", "HEAD", "DEPREL"],
    };

    /// The header line as the model is asked to write it.
    pub fn header(&self) -> String {
        self.columns.join("\t")
    }

    pub fn parse(&self, text: &str) -> Vec<Record> {
        parse_table(text, self.columns)
    }
}

/// Parse a tab-separated table into records keyed by `columns` (lowercased).
///
/// Blank lines, fence delimiter lines and header lines are skipped.  Extra
/// columns are ignored; rows with too few columns are dropped with a debug
/// log.  Never fails.
pub fn parse_table(text: &str, columns: &[&str]) -> Vec<Record> {
    let keys: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
    let mut records = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_fence_line(trimmed) {
            continue;
        }

        let cells: Vec<&str> = line.split('\t').map(str::trim).collect();
        if is_header(&cells, columns) {
            continue;
        }
        if cells.len() < keys.len() {
            log::debug!(
                "parse: line {} has {} of {} columns, dropped: {trimmed:?}",
                line_no + 1,
                cells.len(),
                keys.len()
            );
            continue;
        }

        let record = keys
            .iter()
            .zip(&cells)
            .map(|(k, v)| (k.clone(), (*v).to_string()))
            .collect();
        records.push(record);
    }
    records
}

fn is_fence_line(line: &str) -> bool {
    line.strip_prefix(FENCE)
        .map(|rest| !rest.contains(char::is_whitespace))
        .unwrap_or(false)
}

/// Trailing empty cells (a header ending in a tab) do not count.
fn is_header(cells: &[&str], columns: &[&str]) -> bool {
    let filled = cells
        .iter()
        .rposition(|cell| !cell.is_empty())
        .map_or(0, |last| last + 1);
    filled == columns.len()
        && cells
            .iter()
            .zip(columns)
            .all(|(cell, col)| cell.eq_ignore_ascii_case(col))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn header_is_never_a_record() {
        let rows = TableLayout::MORPHOSYNTAX.parse("FORM\tLEMMA\tUPOS\tFEATS\nrex\trex\tNOUN\tCase=Nom");
        assert_eq!(
            rows,
            vec![record(&[
                ("form", "rex"),
                ("lemma", "rex"),
                ("upos", "NOUN"),
                ("feats", "Case=Nom"),
            ])]
        );
    }

    #[test]
    fn header_match_ignores_case() {
        let rows = parse_table("form\thead\tdeprel\nrex\t0\troot\n", TableLayout::DEPENDENCY.columns);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["head"], "0");
    }

    #[test]
    fn header_with_trailing_tab_is_skipped() {
        let rows = TableLayout::MORPHOSYNTAX.parse("FORM\tLEMMA\tUPOS\tFEATS\t\nrex\trex\tNOUN\tCase=Nom");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["form"], "rex");
    }

    #[test]
    fn row_with_empty_last_cell_is_kept() {
        let rows = TableLayout::MORPHOSYNTAX.parse("et\tet\tCCONJ\t");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["feats"], "");
    }

    #[test]
    fn fences_and_blank_lines_are_skipped() {
        let text = "```tsv\n\nFORM\tHEAD\tDEPREL\nrex\t2\tnsubj\n\nvenit\t0\troot\n```\n";
        let rows = TableLayout::DEPENDENCY.parse(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["form"], "venit");
    }

    #[test]
    fn short_rows_are_dropped_without_failing() {
        let text = "rex\trex\tNOUN\tCase=Nom\nbroken line\nvenit\tvenio\tVERB\t_";
        let rows = TableLayout::MORPHOSYNTAX.parse(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["lemma"], "venio");
    }

    #[test]
    fn extra_columns_are_ignored_and_cells_trimmed() {
        let rows = TableLayout::DEPENDENCY.parse("rex \t 2\tnsubj\tcomment");
        assert_eq!(rows, vec![record(&[("form", "rex"), ("head", "2"), ("deprel", "nsubj")])]);
    }

    #[test]
    fn header_helper_joins_with_tabs() {
        assert_eq!(TableLayout::DEPENDENCY.header(), "FORM\tHEAD\tDEPREL");
    }
}
