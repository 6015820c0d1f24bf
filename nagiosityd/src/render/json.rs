use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use shared::protocol::{
    LAST_COMMAND_CHECK_FIELD, SERVICES_FIELD, SIMPLE_HOST_FIELDS, SIMPLE_NAME, SIMPLE_SERVICE_FIELDS,
};
use shared::types::{parse_number, Block, FieldValue, HostRecord, Snapshot};
use super::{RenderOptions, Verbosity};

/// Longest indent accepted, in spaces or characters
const MAX_INDENT: usize = 10;

#[derive(Serialize)]
struct SimpleStatus<'a> {
    name: &'static str,
    last_command_check: Option<&'a FieldValue>,
    hosts: Vec<SimpleHost<'a>>,
}

impl<'a> SimpleStatus<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            name: SIMPLE_NAME,
            last_command_check: snapshot.program_field(LAST_COMMAND_CHECK_FIELD),
            hosts: snapshot.hosts.iter().map(SimpleHost).collect(),
        }
    }
}

/// Simple projection of a host, followed by its projected services.
struct SimpleHost<'a>(&'a HostRecord);

/// Simple projection of a service.
struct SimpleService<'a>(&'a Block);

impl Serialize for SimpleHost<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let services: Vec<_> = self.0.services.iter().map(SimpleService).collect();

        let mut map = serializer.serialize_map(Some(SIMPLE_HOST_FIELDS.len() + 1))?;
        project(&mut map, &self.0.fields, &SIMPLE_HOST_FIELDS)?;
        map.serialize_entry(SERVICES_FIELD, &services)?;
        map.end()
    }
}

impl Serialize for SimpleService<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SIMPLE_SERVICE_FIELDS.len()))?;
        project(&mut map, self.0, &SIMPLE_SERVICE_FIELDS)?;
        map.end()
    }
}

/// Write `names` from `block` in order; missing fields become null.
fn project<M: SerializeMap>(map: &mut M, block: &Block, names: &[&str]) -> Result<(), M::Error> {
    for name in names {
        map.serialize_entry(name, &block.get(*name))?;
    }
    Ok(())
}

/// Render JSON, simple or verbose per `options`.
pub fn render(snapshot: &Snapshot, options: &RenderOptions) -> Result<String, serde_json::Error> {
    let indent = options.indent.as_deref().map(indent_unit);
    match options.verbosity {
        Verbosity::Simple => to_json(&SimpleStatus::new(snapshot), indent.as_deref()),
        Verbosity::Verbose => to_json(snapshot, indent.as_deref()),
    }
}

/// Render JSON wrapped as `callback(json)`.
pub fn render_jsonp(
    snapshot: &Snapshot,
    options: &RenderOptions,
) -> Result<String, serde_json::Error> {
    Ok(format!("{}({})", options.callback, render(snapshot, options)?))
}

/// Numbers mean that many spaces; anything else is the indent itself.
fn indent_unit(raw: &str) -> String {
    match parse_number(raw).and_then(|n| n.as_f64()) {
        Some(width) => " ".repeat(width.floor().clamp(0.0, MAX_INDENT as f64) as usize),
        None => raw.chars().take(MAX_INDENT).collect(),
    }
}

fn to_json<T: Serialize>(value: &T, indent: Option<&str>) -> Result<String, serde_json::Error> {
    let indent = match indent {
        Some(indent) if !indent.is_empty() => indent,
        _ => return serde_json::to_string(value),
    };

    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut out,
        PrettyFormatter::with_indent(indent.as_bytes()),
    );
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
