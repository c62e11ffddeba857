use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Quality tag found in a channel name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quality {
    FHD,
    HD,
}

impl Quality {
    pub fn badge(&self) -> &'static str {
        match self {
            Quality::FHD => "FHD",
            Quality::HD => "HD",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "FHD" => Some(Quality::FHD),
            "HD" => Some(Quality::HD),
            _ => None,
        }
    }
}

/// Fields pulled out of a display name such as `Первый канал HD orig` or `CNN US`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedFields {
    pub base_name: String,
    pub quality: Option<Quality>,
    pub orig: bool,
    /// Time shift in hours, e.g. `+4`
    pub offset: Option<i32>,
    /// Text in parentheses, e.g. `Омск` or `+2`
    pub region: Option<String>,
    /// Two uppercase letters at the very end, separated by whitespace
    pub country_code: Option<String>,
}

/// Result of running the name pattern over a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Classification {
    Matched(ClassifiedFields),
    Unmatched,
}

impl Classification {
    pub fn fields(&self) -> Option<&ClassifiedFields> {
        match self {
            Classification::Matched(fields) => Some(fields),
            Classification::Unmatched => None,
        }
    }

    pub fn country_code(&self) -> Option<&str> {
        self.fields().and_then(|f| f.country_code.as_deref())
    }
}

// base name, then optional quality, orig, offset, (region) and a trailing
// country code. A bare number only counts as an offset at a word boundary so
// that `ТВ3` stays part of the name.
static CHANNEL_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<name>[\w\s!]+?)\s*",
        r"(?P<quality>FHD|HD)?\s*",
        r"(?P<orig>orig)?\s*",
        r"(?P<offset>[+-]?\b\d+)?\s*",
        r"(?:\((?P<region>[^)]+)\))?",
        r"(?:\s+(?P<country_code>[A-Z]{2}))?$",
    ))
    .expect("channel name pattern")
});

/// Classify a channel display name. Names the pattern does not fit are
/// `Unmatched`, which is a normal outcome.
pub fn classify_name(name: &str) -> Classification {
    let Some(caps) = CHANNEL_NAME_RE.captures(name.trim()) else {
        return Classification::Unmatched;
    };

    Classification::Matched(ClassifiedFields {
        base_name: caps["name"].trim().to_string(),
        quality: caps.name("quality").and_then(|m| Quality::from_tag(m.as_str())),
        orig: caps.name("orig").is_some(),
        offset: caps.name("offset").and_then(|m| parse_offset(m.as_str(), name)),
        region: caps.name("region").map(|m| m.as_str().to_string()),
        country_code: caps.name("country_code").map(|m| m.as_str().to_string()),
    })
}

fn parse_offset(raw: &str, name: &str) -> Option<i32> {
    match raw.parse() {
        Ok(offset) => Some(offset),
        Err(e) => {
            warn!("offset \"{}\" in \"{}\" is out of range ({}), ignoring it", raw, name, e);
            None
        }
    }
}

impl fmt::Display for ClassifiedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{name: {}", self.base_name)?;
        if let Some(q) = self.quality {
            write!(f, ", quality: {}", q.badge())?;
        }
        if self.orig {
            write!(f, ", orig")?;
        }
        if let Some(offset) = self.offset {
            write!(f, ", offset: {:+}", offset)?;
        }
        if let Some(region) = &self.region {
            write!(f, ", region: {}", region)?;
        }
        if let Some(cc) = &self.country_code {
            write!(f, ", country_code: {}", cc)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Matched(fields) => write!(f, "{}", fields),
            Classification::Unmatched => write!(f, "no match"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> ClassifiedFields {
        match classify_name(name) {
            Classification::Matched(f) => f,
            Classification::Unmatched => panic!("expected a match for {:?}", name),
        }
    }

    #[test]
    fn test_quality_and_orig() {
        let f = fields("Первый канал HD orig");
        assert_eq!(f.base_name, "Первый канал");
        assert_eq!(f.quality, Some(Quality::HD));
        assert!(f.orig);
        assert_eq!(f.country_code, None);
    }

    #[test]
    fn test_offset() {
        let f = fields("НТВ +4");
        assert_eq!(f.base_name, "НТВ");
        assert_eq!(f.offset, Some(4));
        assert_eq!(f.quality, None);
    }

    #[test]
    fn test_offset_out_of_range_is_dropped() {
        let f = fields("Канал 99999999999");
        assert_eq!(f.base_name, "Канал");
        assert_eq!(f.offset, None);
        assert_eq!(fields("Канал -12").offset, Some(-12));
    }

    #[test]
    fn test_region() {
        let f = fields("Первый канал (+2)");
        assert_eq!(f.region.as_deref(), Some("+2"));
        let f = fields("СТС (Омск)");
        assert_eq!(f.region.as_deref(), Some("Омск"));
    }

    #[test]
    fn test_country_code_needs_whitespace() {
        assert_eq!(classify_name("Fox News US").country_code(), Some("US"));
        assert_eq!(classify_name("FOXUS").country_code(), None);
        let f = fields("Fox News HD US");
        assert_eq!(f.quality, Some(Quality::HD));
        assert_eq!(f.country_code.as_deref(), Some("US"));
    }

    #[test]
    fn test_digits_inside_name() {
        let f = fields("ТВ3 HD");
        assert_eq!(f.base_name, "ТВ3");
        assert_eq!(f.quality, Some(Quality::HD));
        assert_eq!(f.country_code, None);
        assert_eq!(fields("Россия 1 HD orig").base_name, "Россия 1");
    }

    #[test]
    fn test_fhd() {
        assert_eq!(fields("Матч FHD").quality, Some(Quality::FHD));
    }

    #[test]
    fn test_unmatched() {
        assert_eq!(classify_name("Sport TV+ HD PT"), Classification::Unmatched);
        assert_eq!(classify_name("Россия-1 +2"), Classification::Unmatched);
        assert_eq!(classify_name("   "), Classification::Unmatched);
        assert_eq!(classify_name("").to_string(), "no match");
    }

    #[test]
    fn test_classification_json() {
        let json = serde_json::to_value(classify_name("CNN HD US")).unwrap();
        assert_eq!(json["Matched"]["quality"], "HD");
        assert_eq!(json["Matched"]["country_code"], "US");
        assert_eq!(json["Matched"]["offset"], serde_json::Value::Null);
        assert_eq!(serde_json::to_value(classify_name("A+B")).unwrap(), "Unmatched");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            classify_name("НТВ HD +4 (Мск) RU").to_string(),
            "{name: НТВ, quality: HD, offset: +4, region: Мск, country_code: RU}"
        );
    }
}
