//! Conversion helpers between document text and numeric values.
//! Parsing is best-effort: on malformed input the prefix that did parse is
//! returned and the rest is dropped. Nothing here panics.

use std::fmt::Write as _;

fn parse_list<T: std::str::FromStr>(text: &str) -> Vec<T> {
    text.split_whitespace()
        .map_while(|tok| tok.parse::<T>().ok())
        .collect()
}

/// Whitespace-delimited floats. Accepts the `NaN`/`INF` spellings some exporters emit.
pub fn parse_floats(text: &str) -> Vec<f32> {
    text.split_whitespace()
        .map_while(parse_float)
        .collect()
}

/// A single float token.
pub fn parse_float(tok: &str) -> Option<f32> {
    match tok {
        "NaN" | "QNaN" | "-NaN" => Some(f32::NAN),
        "INF" | "Inf" => Some(f32::INFINITY),
        "-INF" | "-Inf" => Some(f32::NEG_INFINITY),
        _ => tok.parse().ok(),
    }
}

pub fn parse_uints(text: &str) -> Vec<u32> {
    parse_list(text)
}

pub fn parse_ints(text: &str) -> Vec<i32> {
    parse_list(text)
}

/// Whitespace-delimited names (`Name_array`, `IDREF_array`).
pub fn parse_names(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// `true`/`false`/`1`/`0`, case-insensitive. Anything else is `None`.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Format a float with the shortest text that parses back to the same value.
pub fn float_to_text(v: f32) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let text = if v > 0.0 { "INF" } else { "-INF" };
        text.to_string()
    } else if v == 0.0 {
        // normalizes -0
        "0".to_string()
    } else {
        format!("{v}")
    }
}

pub fn floats_to_text(values: &[f32]) -> String {
    let mut out = String::with_capacity(values.len() * 4);
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&float_to_text(*v));
    }
    out
}

pub fn uints_to_text(values: &[u32]) -> String {
    let mut out = String::with_capacity(values.len() * 2);
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{v}");
    }
    out
}

pub fn names_to_text<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a target qualifier to a flat component index.
///
/// - `(i)`      -> i
/// - `(r)(c)`   -> r * 4 + c (row-major 4x4 matrix element)
/// - `.X` `.Y` `.Z` `.W`, `.R` `.G` `.B` `.A`, `.U` `.V`, `.S` `.T` `.P`, `.ANGLE`
///
/// Returns `None` if the qualifier is not understood.
pub fn parse_matrix_element(qualifier: &str) -> Option<usize> {
    let q = qualifier.trim();
    if let Some(rest) = q.strip_prefix('.') {
        return match rest.to_ascii_uppercase().as_str() {
            "X" | "R" | "U" | "S" => Some(0),
            "Y" | "G" | "V" | "T" => Some(1),
            "Z" | "B" | "P" => Some(2),
            "W" | "A" | "ANGLE" => Some(3),
            _ => None,
        };
    }

    let mut indices = Vec::with_capacity(2);
    let mut rest = q;
    while let Some(open) = rest.strip_prefix('(') {
        let close = open.find(')')?;
        indices.push(open[..close].trim().parse::<usize>().ok()?);
        rest = &open[close + 1..];
    }
    if !rest.is_empty() {
        return None;
    }
    match indices.as_slice() {
        [i] => Some(*i),
        [r, c] if *r < 4 && *c < 4 => Some(r * 4 + c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_stop_at_first_malformed_token() {
        assert_eq!(parse_floats(" 0 1.5\n-2 "), vec![0.0, 1.5, -2.0]);
        assert_eq!(parse_floats("1 2 x 4"), vec![1.0, 2.0]);
        assert!(parse_floats("").is_empty());
        assert!(parse_floats("INF")[0].is_infinite());
    }

    #[test]
    fn float_text_roundtrips() {
        let values = [0.0, -0.0, 1.0, 0.1, -3.25, 1e-7];
        let text = floats_to_text(&values);
        let back = parse_floats(&text);
        assert_eq!(back.len(), values.len());
        for (a, b) in values.iter().zip(back.iter()) {
            assert_eq!(a, b);
        }
        assert_eq!(floats_to_text(&[1.0, 2.5]), "1 2.5");
    }

    #[test]
    fn names_and_bools() {
        assert_eq!(parse_names("LINEAR  BEZIER"), vec!["LINEAR", "BEZIER"]);
        assert_eq!(names_to_text(&["A", "B"]), "A B");
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_uints("3 4 -1"), vec![3, 4]);
    }

    #[test]
    fn matrix_elements() {
        assert_eq!(parse_matrix_element("(3)"), Some(3));
        assert_eq!(parse_matrix_element("(1)(2)"), Some(6));
        assert_eq!(parse_matrix_element(".Y"), Some(1));
        assert_eq!(parse_matrix_element(".ANGLE"), Some(3));
        assert_eq!(parse_matrix_element("(4)(0)"), None);
        assert_eq!(parse_matrix_element("(x)"), None);
        assert_eq!(parse_matrix_element(".weird"), None);
        assert_eq!(parse_matrix_element(""), None);
    }
}
