/// Block labels in the status file
pub const INFO_LABEL: &str = "info";
pub const PROGRAM_LABEL: &str = "programstatus";
pub const CONTACT_LABEL: &str = "contactstatus";
pub const HOST_LABEL: &str = "hoststatus";
pub const SERVICE_LABEL: &str = "servicestatus";

/// Fields linking services to hosts
pub const HOST_NAME_FIELD: &str = "host_name";
pub const SERVICE_DESCRIPTION_FIELD: &str = "service_description";

/// Member holding a host's services in rendered output; host blocks may not
/// use it as a field name
pub const SERVICES_FIELD: &str = "services";

/// Program field carried by the simple projection
pub const LAST_COMMAND_CHECK_FIELD: &str = "last_command_check";

/// Value of the `name` member/attribute in simple output
pub const SIMPLE_NAME: &str = "nagios";

/// Fields of the simple projection, in output order
pub const SIMPLE_HOST_FIELDS: [&str; 4] =
    ["host_name", "current_state", "current_attempt", "last_check"];
pub const SIMPLE_SERVICE_FIELDS: [&str; 4] = [
    "service_description",
    "current_state",
    "current_attempt",
    "last_check",
];

/// Query parameters
pub const QUERY_VERBOSE: &str = "verbose";
pub const QUERY_INDENT: &str = "indent";
pub const QUERY_CALLBACK: &str = "callback";
pub const QUERY_JSONP: &str = "jsonp";

/// IMF-fixdate layout used for `Last-Modified`
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Obsolete HTTP date layouts still accepted on input: RFC 850 and asctime
pub const OBSOLETE_HTTP_DATE_FORMATS: [&str; 2] =
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];

/// Output representations the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Jsonp,
    Xml,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Jsonp, Format::Xml];

    /// Format name, also used as the URL suffix
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Jsonp => "jsonp",
            Format::Xml => "xml",
        }
    }

    /// Canonical media type, sent as `Content-Type`
    pub fn media_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Jsonp => "application/javascript",
            Format::Xml => "text/xml",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.name() == name)
    }

    /// Exact match only: parameters or extra media ranges disqualify.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.media_type() == media_type)
    }
}
