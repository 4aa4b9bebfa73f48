//! Plain-text formatting helpers shared by the CLI and report renderers

use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

/// Grid-style text table
///
/// Column widths are measured in terminal cells, so names in wide scripts
/// line up with ASCII ones.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with empty cells
    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len().max(cells.len()), String::new());
        self.rows.push(cells);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|i| {
                std::iter::once(&self.headers)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.width())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let rule = |fill: char| -> String {
            let mut line = String::from("+");
            for width in &widths {
                line.extend(std::iter::repeat(fill).take(width + 2));
                line.push('+');
            }
            line
        };
        let line = |cells: &[String]| -> String {
            let mut line = String::from("|");
            for (i, width) in widths.iter().enumerate() {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                let pad = width - cell.width();
                line.push(' ');
                line.push_str(cell);
                line.extend(std::iter::repeat(' ').take(pad + 1));
                line.push('|');
            }
            line
        };

        let mut out = vec![rule('-'), line(&self.headers), rule('=')];
        for row in &self.rows {
            out.push(line(row));
            out.push(rule('-'));
        }
        if self.rows.is_empty() {
            out.pop();
            out.push(rule('-'));
        }
        out.join("\n")
    }
}

/// Number with thousands separators and two decimals
pub fn budget(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Optional budget, `N/A` when unset
pub fn optional_budget(amount: Option<f64>) -> String {
    amount.map_or_else(|| "N/A".to_string(), budget)
}

/// `[#####     ] 50.0%` style bar
///
/// The fill is clamped to the bar; the percentage is printed as is, so a
/// KPI past its target shows a full bar and e.g. `150.0%`.
pub fn progress_bar(current: Option<f64>, target: Option<f64>, width: usize) -> String {
    let (current, target) = match (current, target) {
        (Some(c), Some(t)) if t != 0.0 => (c, t),
        _ => return format!("[{}] N/A", " ".repeat(width)),
    };

    let ratio = current / target;
    let filled = (width as f64 * ratio.clamp(0.0, 1.0)) as usize;
    format!(
        "[{}{}] {:.1}%",
        "#".repeat(filled),
        " ".repeat(width - filled),
        ratio * 100.0
    )
}

/// Human-readable date span
pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("{} to {}", s, e),
        (Some(s), None) => format!("from {}", s),
        (None, Some(e)) => format!("until {}", e),
        (None, None) => "unspecified".to_string(),
    }
}

/// Optional number without trailing zeros noise
pub fn number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{}", v),
        None => "-".to_string(),
    }
}

/// Optional text, `-` when unset
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
