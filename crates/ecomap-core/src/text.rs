//! Text helpers: collation for display ordering and locale number formatting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

// ── Collation ─────────────────────────────────────────────────────────────────

/// Fold a character for base-sensitivity comparison: lowercase, accents removed.
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        _ => lower_char(c),
    }
}

fn lower_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Locale-aware ascending comparison: letters compare by base form first
/// ("Árbol" sorts with "arbol"), then by accents, then by case with
/// lowercase first ("a" < "A" < "á").
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(fold_char)
        .cmp(b.chars().map(fold_char))
        .then_with(|| a.chars().map(lower_char).cmp(b.chars().map(lower_char)))
        .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

/// Numeric-aware comparison: runs of digits compare by value, so "SP2" sorts
/// before "SP10" and "P7" before "P74".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut xs = Chunks::new(a);
    let mut ys = Chunks::new(b);
    loop {
        match (xs.next(), ys.next()) {
            (None, None) => return locale_cmp(a, b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x, y) {
                    (Chunk::Digits(dx), Chunk::Digits(dy)) => cmp_digit_runs(dx, dy),
                    (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
                    (Chunk::Text(tx), Chunk::Text(ty)) => {
                        tx.chars().map(fold_char).cmp(ty.chars().map(fold_char))
                    }
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Compare two ASCII digit runs by value without parsing (no overflow).
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map_or(self.rest.len(), |(i, _)| i);
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(if digits { Chunk::Digits(head) } else { Chunk::Text(head) })
    }
}

// ── Numbers ───────────────────────────────────────────────────────────────────

/// Separators used when rendering numbers for display. Defaults to es-CL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub thousands_separator: char,
    pub decimal_separator: char,
    pub max_fraction_digits: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            thousands_separator: '.',
            decimal_separator: ',',
            max_fraction_digits: 3,
        }
    }
}

impl NumberFormat {
    /// Render `value` with grouped thousands and trailing zeros trimmed.
    /// Non-finite values are rendered as-is.
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let fixed = format!("{:.*}", self.max_fraction_digits, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, f.trim_end_matches('0')),
            None => (fixed.as_str(), ""),
        };

        let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
        let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
        if negative {
            out.push('-');
        }
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                out.push(self.thousands_separator);
            }
            out.push(c);
        }
        if !frac_part.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }
}

/// Parse a string the way a lenient numeric field reader would: surrounding
/// whitespace allowed, the whole remainder must be a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Digit runs of `code` read as integers, in order ("SP1-004" → `[1, 4]`).
/// `None` when the code has no digits or a run does not fit in a `u64`.
pub fn digit_runs(code: &str) -> Option<Vec<u64>> {
    let runs = Chunks::new(code)
        .filter_map(|chunk| match chunk {
            Chunk::Digits(d) => Some(d.parse::<u64>().ok()),
            Chunk::Text(_) => None,
        })
        .collect::<Option<Vec<_>>>()?;
    (!runs.is_empty()).then_some(runs)
}

/// Whether a value should be rendered as a link.
pub fn is_url(s: &str) -> bool {
    let s = s.trim();
    (s.starts_with("http://") || s.starts_with("https://")) && !s.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order_compares_digit_runs_by_value() {
        let mut ids = vec!["SP10", "SP2", "SP1-004", "SP1", "sp3"];
        ids.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(ids, ["SP1", "SP1-004", "SP2", "sp3", "SP10"]);
    }

    #[test]
    fn natural_order_handles_leading_zeros_and_huge_runs() {
        assert_eq!(natural_cmp("P007", "P7"), Ordering::Less, "ties fall back to text order");
        assert_eq!(natural_cmp("P7", "P74"), Ordering::Less);
        assert_eq!(
            natural_cmp("X99999999999999999999999", "X100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn locale_order_ignores_case_and_accents_first() {
        let mut names = vec!["Matorral", "árbol", "Bosque", "arbusto"];
        names.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(names, ["árbol", "arbusto", "Bosque", "Matorral"]);
    }

    #[test]
    fn case_only_differences_put_lowercase_first() {
        let mut names = vec!["Á", "A", "á", "a"];
        names.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(names, ["a", "A", "á", "Á"]);
        assert_eq!(locale_cmp("bosque", "Bosque"), Ordering::Less);
    }

    #[test]
    fn formats_with_chilean_separators() {
        let f = NumberFormat::default();
        assert_eq!(f.format(1234567.5), "1.234.567,5");
        assert_eq!(f.format(999.0), "999");
        assert_eq!(f.format(1000.0), "1.000");
        assert_eq!(f.format(-2500.125), "-2.500,125");
        assert_eq!(f.format(0.0004), "0");
        assert_eq!(f.format(-0.0001), "0", "negative zero loses its sign");
    }

    #[test]
    fn whole_number_format_rounds() {
        let f = NumberFormat { max_fraction_digits: 0, ..NumberFormat::default() };
        assert_eq!(f.format(12345.6), "12.346");
    }

    #[test]
    fn digit_runs_keep_their_boundaries() {
        assert_eq!(digit_runs("AP-0123"), Some(vec![123]));
        assert_eq!(digit_runs("000"), Some(vec![0]));
        assert_eq!(digit_runs("SP1-004"), Some(vec![1, 4]));
        assert_ne!(digit_runs("SP1-004"), digit_runs("SP10-04"));
        assert_ne!(digit_runs("SP1-004"), digit_runs("SP100-4"));
        assert_eq!(digit_runs("sin codigo"), None);
        assert_eq!(digit_runs("X99999999999999999999999"), None);
    }

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.org/ficha?id=1"));
        assert!(!is_url("ftp://example.org"));
        assert!(!is_url("http://a b"));
    }
}
