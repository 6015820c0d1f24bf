pub mod json;
pub mod xml;

use shared::protocol::Format;
use shared::types::Snapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Fixed field projection of hosts and services
    #[default]
    Simple,
    /// The whole snapshot
    Verbose,
}

/// Per-request rendering choices derived from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub verbosity: Verbosity,
    /// Raw `indent` query value
    pub indent: Option<String>,
    /// JSONP function name; empty when none was given
    pub callback: String,
}

/// Render a snapshot as a response body. Never mutates the snapshot.
pub fn render(
    snapshot: &Snapshot,
    format: Format,
    options: &RenderOptions,
) -> Result<String, serde_json::Error> {
    match format {
        Format::Json => json::render(snapshot, options),
        Format::Jsonp => json::render_jsonp(snapshot, options),
        // Verbose XML has no schema of its own
        Format::Xml => Ok(xml::render(snapshot)),
    }
}
