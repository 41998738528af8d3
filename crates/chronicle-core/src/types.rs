//! Core data model: readings, links, annotations, label specs and sections.
//!
//! These mirror the JSON documents served by the annotation store. Unknown
//! fields are carried through untouched so that records can be written back
//! without loss.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use smol_str::{SmolStr, ToSmolStr};

/// Identifier of a rendered reading.
///
/// The numeric part is the reading's position in the section text; the
/// rendered form is `r<position>`, which is also the DOM id of the reading
/// element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u64);

impl TokenId {
    /// Parse either `r<n>` or a bare `<n>`.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.trim().strip_prefix('r').unwrap_or(s.trim());
        digits.parse().ok().map(TokenId)
    }

    /// The position as a link target, `None` past `i64::MAX`.
    pub fn as_target(self) -> Option<i64> {
        i64::try_from(self.0).ok()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(u64),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(n) => Ok(TokenId(n)),
            Wire::Text(s) => TokenId::parse(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid reading id: {s}"))),
        }
    }
}

/// A single rendered unit of section text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadingToken {
    pub id: TokenId,
    #[serde(alias = "lemma", alias = "rdg")]
    pub text: String,
}

impl ReadingToken {
    pub fn new(position: u64, text: impl Into<String>) -> Self {
        Self {
            id: TokenId(position),
            text: text.into(),
        }
    }
}

/// Type of a directed link.
///
/// `BEGIN` and `END` anchor an annotation to a span of readings; every other
/// type names the role under which an entity is attached to a reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkType {
    Begin,
    End,
    Role(SmolStr),
}

impl LinkType {
    pub fn as_str(&self) -> &str {
        match self {
            LinkType::Begin => "BEGIN",
            LinkType::End => "END",
            LinkType::Role(name) => name,
        }
    }

    pub fn role(name: impl AsRef<str>) -> Self {
        LinkType::from(name.as_ref())
    }
}

impl From<&str> for LinkType {
    fn from(s: &str) -> Self {
        match s {
            "BEGIN" => LinkType::Begin,
            "END" => LinkType::End,
            other => LinkType::Role(other.to_smolstr()),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LinkType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LinkType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = SmolStr::deserialize(deserializer)?;
        Ok(LinkType::from(s.as_str()))
    }
}

/// A directed, typed edge from an annotation to an integer target.
///
/// The target is either another annotation's id or a reading position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub target: i64,
}

impl Link {
    pub fn new(link_type: impl Into<LinkType>, target: i64) -> Self {
        Self {
            link_type: link_type.into(),
            target,
        }
    }
}

/// A stored annotation record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    pub label: SmolStr,
    #[serde(default)]
    pub links: Vec<Link>,
    /// Everything else the store sends along (properties, audit fields).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    pub fn new(id: i64, label: impl Into<SmolStr>, links: Vec<Link>) -> Self {
        Self {
            id,
            label: label.into(),
            links,
            extra: Map::new(),
        }
    }

    /// Anchor this annotation to the span `start..=end`.
    ///
    /// An endpoint with no link target representation gets no link.
    pub fn anchored(id: i64, label: impl Into<SmolStr>, start: TokenId, end: TokenId) -> Self {
        let links = [(LinkType::Begin, start), (LinkType::End, end)]
            .into_iter()
            .filter_map(|(link_type, id)| id.as_target().map(|target| Link::new(link_type, target)))
            .collect();
        Self::new(id, label, links)
    }

    pub fn has_link(&self, link_type: &LinkType, target: i64) -> bool {
        self.links
            .iter()
            .any(|l| &l.link_type == link_type && l.target == target)
    }
}

/// Metadata describing the fields expected for one annotation label.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSpec {
    #[serde(default)]
    pub name: SmolStr,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AnnotationSpec {
    /// True for the placeholder handed out for unknown labels.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.fields.is_empty()
    }
}

/// Label specs indexed by lowercased name.
#[derive(Clone, Debug, Default)]
pub struct SpecRegistry {
    specs: HashMap<SmolStr, AnnotationSpec>,
    empty: AnnotationSpec,
}

impl SpecRegistry {
    pub fn new(specs: impl IntoIterator<Item = AnnotationSpec>) -> Self {
        let specs = specs
            .into_iter()
            .map(|spec| (spec.name.to_lowercase().to_smolstr(), spec))
            .collect();
        Self {
            specs,
            empty: AnnotationSpec::default(),
        }
    }

    /// Look up a spec; unknown labels yield an empty spec.
    pub fn get(&self, label: &str) -> &AnnotationSpec {
        self.specs
            .get(label.to_lowercase().as_str())
            .unwrap_or(&self.empty)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Identifier of a text section, used in store URLs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SectionId(pub SmolStr);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        SectionId(s.to_smolstr())
    }
}

impl Serialize for SectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for SectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(i64),
            Text(SmolStr),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Number(n) => SectionId(n.to_smolstr()),
            Wire::Text(s) => SectionId(s),
        })
    }
}

/// A section descriptor from the store's section list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Section {
    /// Human-readable name, falling back to the id.
    pub fn display_name(&self) -> String {
        ["displayname", "title", "name"]
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
            .unwrap_or_else(|| self.id.to_string())
    }
}
