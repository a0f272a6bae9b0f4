//! TargetPath parsing and formatting.
//!
//! Grammar for animation channel and driver targets:
//!   pointer[(element)][qualifier]
//! - `pointer` is `node/.../property`; '/' separates element ids and the
//!   targeted property sid
//! - `qualifier` selects a component: `.X`, `.ANGLE`, `(i)` or `(r)(c)`
//! - `(element)` selects an entry of an animated array and is only recognized
//!   when another qualifier follows it
//!   Examples:
//!   "cube/translate.X"       -> pointer="cube/translate", qualifier=".X"
//!   "cube/transform(1)(2)"   -> pointer="cube/transform", qualifier="(1)(2)"
//!   "morph/weights(3)"       -> pointer="morph/weights", qualifier="(3)"
//!   "morph/targets(2).weight"-> pointer="morph/targets", element=2, qualifier=".weight"
//!   "light/color"            -> pointer="light/color", qualifier=""

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TargetPath {
    /// Element id path plus property sid.
    pub pointer: String,
    /// Animated array element, if any.
    pub element: Option<u32>,
    /// Component selector, including its leading '.' or '('. May be empty.
    pub qualifier: String,
}

fn parse_groups(mut s: &str) -> Result<(Vec<u32>, &str), String> {
    let mut groups = Vec::new();
    while let Some(open) = s.strip_prefix('(') {
        let close = open
            .find(')')
            .ok_or_else(|| "invalid target: unbalanced '('".to_string())?;
        let idx = open[..close]
            .trim()
            .parse::<u32>()
            .map_err(|_| "invalid target: non-numeric index".to_string())?;
        groups.push(idx);
        s = &open[close + 1..];
    }
    Ok((groups, s))
}

impl TargetPath {
    pub fn new(pointer: impl Into<String>, element: Option<u32>, qualifier: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            element,
            qualifier: qualifier.into(),
        }
    }

    /// Parse a target string according to the grammar above.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("empty target".to_string());
        }
        if s.chars().any(char::is_whitespace) {
            return Err("invalid target: contains whitespace".to_string());
        }
        // Selectors only start after the last '/'.
        let tail_start = s.rfind('/').map(|i| i + 1).unwrap_or(0);
        let split = s[tail_start..]
            .find(['.', '('])
            .map(|i| tail_start + i)
            .unwrap_or(s.len());
        let pointer = &s[..split];
        if pointer.is_empty() || pointer.ends_with('/') || pointer.starts_with('/') {
            return Err("invalid target: empty pointer".to_string());
        }
        if pointer.split('/').any(|seg| seg.is_empty()) {
            return Err("invalid target: empty pointer segment".to_string());
        }

        let selectors = &s[split..];
        let (groups, rest) = parse_groups(selectors)?;
        if !rest.is_empty() {
            let field = rest
                .strip_prefix('.')
                .ok_or_else(|| "invalid target: malformed qualifier".to_string())?;
            if field.is_empty() || field.contains(['.', '(', ')']) {
                return Err("invalid target: malformed field qualifier".to_string());
            }
        }

        let (element, qualifier) = match (groups.as_slice(), rest.is_empty()) {
            ([], _) => (None, rest.to_string()),
            ([e], false) => (Some(*e), rest.to_string()),
            ([_], true) | ([_, _], true) => (None, selectors.to_string()),
            ([e, _, _], true) => {
                let first_close = selectors.find(')').map(|i| i + 1).unwrap_or(0);
                (Some(*e), selectors[first_close..].to_string())
            }
            _ => return Err("invalid target: too many index groups".to_string()),
        };

        Ok(TargetPath {
            pointer: pointer.to_string(),
            element,
            qualifier,
        })
    }

    /// Element id of the animated entity (first pointer segment).
    pub fn entity_id(&self) -> &str {
        self.pointer.split('/').next().unwrap_or_default()
    }

    /// Property sid (last pointer segment).
    pub fn property(&self) -> &str {
        self.pointer.rsplit('/').next().unwrap_or_default()
    }

    pub fn has_qualifier(&self) -> bool {
        !self.qualifier.is_empty()
    }

    /// Same path with a different component selector.
    pub fn with_qualifier(&self, qualifier: impl Into<String>) -> Self {
        Self {
            pointer: self.pointer.clone(),
            element: self.element,
            qualifier: qualifier.into(),
        }
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pointer)?;
        if let Some(e) = self.element {
            write!(f, "({e})")?;
        }
        f.write_str(&self.qualifier)
    }
}

impl FromStr for TargetPath {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for TargetPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TargetPath {
    fn deserialize<D>(deserializer: D) -> Result<TargetPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TargetPath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_qualifier() {
        let p = TargetPath::parse("cube/translate.X").unwrap();
        assert_eq!(p.pointer, "cube/translate");
        assert_eq!(p.element, None);
        assert_eq!(p.qualifier, ".X");
        assert_eq!(p.entity_id(), "cube");
        assert_eq!(p.property(), "translate");
        assert_eq!(p.to_string(), "cube/translate.X");
    }

    #[test]
    fn parse_matrix_qualifier() {
        let p = TargetPath::parse("cube/transform(1)(2)").unwrap();
        assert_eq!(p.pointer, "cube/transform");
        assert_eq!(p.qualifier, "(1)(2)");
        assert_eq!(p.to_string(), "cube/transform(1)(2)");
    }

    #[test]
    fn parse_element_and_field() {
        let p = TargetPath::parse("morph/targets(2).weight").unwrap();
        assert_eq!(p.element, Some(2));
        assert_eq!(p.qualifier, ".weight");
        assert_eq!(p.to_string(), "morph/targets(2).weight");

        let q = TargetPath::parse("morph/weights(3)").unwrap();
        assert_eq!(q.element, None);
        assert_eq!(q.qualifier, "(3)");

        let r = TargetPath::parse("skin/bind(4)(0)(3)").unwrap();
        assert_eq!(r.element, Some(4));
        assert_eq!(r.qualifier, "(0)(3)");
        assert_eq!(r.to_string(), "skin/bind(4)(0)(3)");
    }

    #[test]
    fn parse_without_qualifier() {
        let p = TargetPath::parse("light/color").unwrap();
        assert!(!p.has_qualifier());
        assert_eq!(p.to_string(), "light/color");
        // dots before the last '/' belong to the pointer
        let q = TargetPath::parse("scene.a/node").unwrap();
        assert_eq!(q.pointer, "scene.a/node");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(TargetPath::parse("").is_err());
        assert!(TargetPath::parse("cube /translate").is_err());
        assert!(TargetPath::parse("cube/.X").is_err());
        assert!(TargetPath::parse("cube/transform(1").is_err());
        assert!(TargetPath::parse("cube/transform(a)").is_err());
        assert!(TargetPath::parse("cube//translate.X").is_err());
        assert!(TargetPath::parse("cube/translate.X.Y").is_err());
    }

    #[test]
    fn serde_as_string() {
        let p = TargetPath::parse("cube/rotateY.ANGLE").unwrap();
        let s = serde_json::to_string(&p).unwrap();
        assert_eq!(s, "\"cube/rotateY.ANGLE\"");
        let back: TargetPath = serde_json::from_str(&s).unwrap();
        assert_eq!(back, p);
    }
}
