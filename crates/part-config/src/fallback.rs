use crate::set::Value;

/// Documented default for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    Float(f64),
    Text(&'static str),
}

impl Fallback {
    pub fn to_value(self) -> Value {
        match self {
            Fallback::Float(v) => Value::Float(v),
            Fallback::Text(s) => Value::Text(s.to_string()),
        }
    }
}

/// Every documented (section, key) with its fallback.
pub const FALLBACKS: &[(&str, &str, Fallback)] = &[
    ("connector", "depth", Fallback::Float(6.5)),
    ("connector", "diameter", Fallback::Float(10.1)),
    ("connector", "pitch", Fallback::Float(0.874)),
    ("shaft", "length", Fallback::Float(20.0)),
    ("shaft", "diameter", Fallback::Float(11.5)),
    ("shaft", "interference", Fallback::Float(0.5)),
    ("fitting", "diameter", Fallback::Float(17.5)),
    ("fitting", "depth", Fallback::Float(4.5)),
    ("fitting", "pitch", Fallback::Float(1.25)),
    ("fitting", "tolerance", Fallback::Float(0.5)),
    ("fitting", "hex_diameter", Fallback::Float(21.0)),
    ("tube", "outer_diameter", Fallback::Float(6.0)),
    ("tube", "outer_tolerance", Fallback::Float(0.5)),
    ("tube", "inner_diameter", Fallback::Float(3.0)),
    ("tube", "inner_tolerance", Fallback::Float(0.4)),
    ("bend", "angle", Fallback::Float(10.0)),
    ("funnel", "length", Fallback::Float(40.0)),
    ("funnel", "top_scale", Fallback::Float(1.5)),
    ("funnel", "minimum_wall", Fallback::Float(1.5)),
    ("funnel", "style", Fallback::Text("hex")),
    ("general", "revision", Fallback::Text("R1.0")),
    ("general", "label_depth", Fallback::Float(0.4)),
];

/// Look up the documented fallback for a key.
pub fn fallback(section: &str, key: &str) -> Option<Value> {
    FALLBACKS
        .iter()
        .find(|(s, k, _)| *s == section && *k == key)
        .map(|(_, _, f)| f.to_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let mut seen = HashSet::new();
        for (s, k, _) in FALLBACKS {
            assert!(seen.insert((*s, *k)), "duplicate fallback {}.{}", s, k);
        }
    }

    #[test]
    fn lookup_hits_and_misses() {
        assert_eq!(fallback("shaft", "diameter"), Some(Value::Float(11.5)));
        assert_eq!(
            fallback("funnel", "style"),
            Some(Value::Text("hex".to_string()))
        );
        assert_eq!(fallback("shaft", "colour"), None);
    }

    #[test]
    fn keys_no_part_reads_have_no_default() {
        assert_eq!(fallback("fitting", "hex_depth"), None);
        assert_eq!(fallback("general", "font-path"), None);
    }
}
