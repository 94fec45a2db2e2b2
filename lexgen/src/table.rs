//! A tiny column-aligned table builder, used only by the debug
//! pretty-printers in [`crate::print`].

use std::cmp::max;

#[derive(Default, Debug, Clone)]
pub(crate) struct Table {
    row_len: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        if row.len() > self.row_len.len() {
            self.row_len.resize(row.len(), 0);
        }
        self.row_len
            .iter_mut()
            .zip(&row)
            .for_each(|(max_len, s)| *max_len = max(*max_len, s.chars().count()));
        self.rows.push(row);
    }

    pub(crate) fn to_string(&self, sep: &str) -> String {
        let pad = |s: &str, l: usize| {
            let cs = s.chars().count();
            if cs < l {
                format!("{s}{}", " ".repeat(l - cs))
            } else {
                s.to_string()
            }
        };
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.row_len)
                    .map(|(s, l)| format!("{}{sep}", pad(s, *l)))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
