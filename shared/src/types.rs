use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A single typed value from a status block.
///
/// Empty source text is `Null`, text that round-trips exactly through a JSON
/// number is `Number`, everything else is kept as `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(Number),
    Text(String),
}

impl FieldValue {
    /// Classify raw text from a `name=value` line.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            return FieldValue::Null;
        }

        match parse_number(raw) {
            Some(number) => FieldValue::Number(number),
            None => FieldValue::Text(raw.to_string()),
        }
    }

    /// Text used when this value identifies a record, e.g. a host name.
    pub fn key_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
        }
    }
}

/// Renders the source text back; `Null` renders as the empty string.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parses `raw` as a number only if the number prints back as exactly `raw`.
pub fn parse_number(raw: &str) -> Option<Number> {
    let number = if let Ok(i) = raw.parse::<i64>() {
        Number::from(i)
    } else if let Ok(u) = raw.parse::<u64>() {
        Number::from(u)
    } else {
        Number::from_f64(raw.parse::<f64>().ok()?)?
    };

    (number.to_string() == raw).then_some(number)
}

/// Field name to value. Sorted keys keep rendered output deterministic.
pub type Block = BTreeMap<String, FieldValue>;

/// A `hoststatus` block together with the services that reference it,
/// in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(flatten)]
    pub fields: Block,
    pub services: Vec<Block>,
}

impl HostRecord {
    pub fn new(fields: Block) -> Self {
        Self {
            fields,
            services: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// One fully assembled read of the status file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Block>,
    pub hosts: Vec<HostRecord>,
}

impl Snapshot {
    pub fn program_field(&self, name: &str) -> Option<&FieldValue> {
        self.program.as_ref().and_then(|program| program.get(name))
    }
}
