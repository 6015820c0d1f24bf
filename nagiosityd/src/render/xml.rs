use shared::protocol::{LAST_COMMAND_CHECK_FIELD, SIMPLE_HOST_FIELDS, SIMPLE_NAME, SIMPLE_SERVICE_FIELDS};
use shared::types::{Block, FieldValue, Snapshot};

/// Render the simple projection as XML.
///
/// Layout matches the legacy nagiosity output. Attribute values are escaped,
/// so values without markup characters come out byte-identical to it.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::from("<?xml version='1.0'?>\n");

    out.push_str(&format!(
        "<nagios name='{}' {}>\n",
        SIMPLE_NAME,
        attribute(
            LAST_COMMAND_CHECK_FIELD,
            snapshot.program_field(LAST_COMMAND_CHECK_FIELD)
        )
    ));
    out.push_str("  <hosts>\n");

    for host in &snapshot.hosts {
        out.push_str(&format!(
            "    <host {}>\n",
            attributes(&host.fields, &SIMPLE_HOST_FIELDS)
        ));
        for service in &host.services {
            out.push_str(&format!(
                "      <service {} />\n",
                attributes(service, &SIMPLE_SERVICE_FIELDS)
            ));
        }
        out.push_str("    </host>\n");
    }

    out.push_str("  </hosts>\n");
    out.push_str("</nagios>\n");
    out
}

fn attributes(block: &Block, names: &[&str]) -> String {
    names
        .iter()
        .map(|name| attribute(name, block.get(*name)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `name='value'`; null and missing values are empty.
fn attribute(name: &str, value: Option<&FieldValue>) -> String {
    let value = value.map(ToString::to_string).unwrap_or_default();
    format!("{}='{}'", name, escape(&value))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
