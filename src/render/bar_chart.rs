//! Horizontal text bar chart

use super::{ChartEntry, ChartRenderer};
use crate::error::Result;

const BAR: char = '█';

/// Renders rows top to bottom in the order given, so the most frequent word
/// sits on the first line. The largest value fills `width` cells.
#[derive(Debug, Clone)]
pub struct TextBarChart {
    width: usize,
}

impl TextBarChart {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    fn bar_len(&self, value: u64, max: u64) -> usize {
        if max == 0 || value == 0 {
            return 0;
        }
        let scaled = (value as u128 * self.width as u128).div_ceil(max as u128);
        scaled as usize
    }
}

impl ChartRenderer for TextBarChart {
    fn render(&self, title: &str, entries: &[ChartEntry]) -> Result<String> {
        let mut out = format!("{title}\n{}\n", "=".repeat(title.chars().count()));

        if entries.is_empty() {
            out.push_str("(no words)\n");
            return Ok(out);
        }

        let label_width = entries
            .iter()
            .map(|e| e.label.chars().count())
            .max()
            .unwrap_or(0);
        let max = entries.iter().map(|e| e.value).max().unwrap_or(0);

        for entry in entries {
            let bar: String = std::iter::repeat(BAR)
                .take(self.bar_len(entry.value, max))
                .collect();
            out.push_str(&format!(
                "{:<label_width$} | {} {}\n",
                entry.label, bar, entry.value
            ));
        }

        Ok(out)
    }
}
