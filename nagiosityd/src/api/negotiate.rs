use axum::extract::Query;
use axum::http::{Method, StatusCode, Uri};
use thiserror::Error;
use shared::protocol::{Format, QUERY_CALLBACK, QUERY_INDENT, QUERY_JSONP, QUERY_VERBOSE};
use crate::render::{RenderOptions, Verbosity};

/// Request-shape outcomes decided before any file I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("only GET is supported")]
    MethodNotAllowed,

    #[error("no resource at this path")]
    NotFound,

    #[error("no acceptable representation")]
    NotAcceptable,

    #[error("JSONP callback requested for a non-JSON format")]
    CallbackConflict,

    #[error("malformed query string")]
    BadQuery,
}

impl Rejection {
    pub fn status_code(self) -> StatusCode {
        match self {
            Rejection::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Rejection::NotFound => StatusCode::NOT_FOUND,
            Rejection::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Rejection::CallbackConflict | Rejection::BadQuery => StatusCode::BAD_REQUEST,
        }
    }
}

/// Fully resolved representation for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub format: Format,
    pub options: RenderOptions,
}

/// Query parameters that affect rendering
#[derive(Debug, Default)]
struct QueryOptions {
    verbose: bool,
    indent: Option<String>,
    callback: Option<String>,
}

impl QueryOptions {
    fn from_uri(uri: &Uri) -> Result<Self, Rejection> {
        let Query(pairs) =
            Query::<Vec<(String, String)>>::try_from_uri(uri).map_err(|_| Rejection::BadQuery)?;

        let first = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        };

        Ok(Self {
            verbose: pairs.iter().any(|(name, _)| name == QUERY_VERBOSE),
            indent: first(QUERY_INDENT),
            callback: first(QUERY_CALLBACK).or_else(|| first(QUERY_JSONP)),
        })
    }
}

/// Decide how to answer a request for `resource_path`.
///
/// Order: method, path (after removing a `.suffix`), exact `Accept` match
/// overriding the suffix, then query options. A callback upgrades JSON to
/// JSONP and conflicts with XML.
pub fn negotiate(
    method: &Method,
    uri: &Uri,
    accept: Option<&str>,
    resource_path: &str,
) -> Result<Negotiated, Rejection> {
    if *method != Method::GET {
        return Err(Rejection::MethodNotAllowed);
    }

    let (path, suffix) = split_suffix(uri.path());
    if path != resource_path {
        return Err(Rejection::NotFound);
    }

    let format = match (accept.and_then(Format::from_media_type), suffix) {
        (Some(format), _) => format,
        (None, Some(suffix)) => Format::from_name(suffix).ok_or(Rejection::NotAcceptable)?,
        (None, None) if accepts_default(accept) => Format::Json,
        (None, None) => return Err(Rejection::NotAcceptable),
    };

    let query = QueryOptions::from_uri(uri)?;
    let format = match (format, query.callback.is_some()) {
        (Format::Json, true) => Format::Jsonp,
        (Format::Xml, true) => return Err(Rejection::CallbackConflict),
        (format, _) => format,
    };

    Ok(Negotiated {
        format,
        options: RenderOptions {
            verbosity: if query.verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Simple
            },
            indent: query.indent,
            callback: query.callback.unwrap_or_default(),
        },
    })
}

/// `/status.json` becomes (`/status`, `json`). Dots in earlier segments are
/// left alone.
fn split_suffix(path: &str) -> (&str, Option<&str>) {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[segment_start..].rfind('.') {
        Some(dot) => {
            let dot = segment_start + dot;
            (&path[..dot], Some(&path[dot + 1..]))
        }
        None => (path, None),
    }
}

/// Whether the default format (JSON) satisfies an `Accept` header that did
/// not name a format exactly.
fn accepts_default(accept: Option<&str>) -> bool {
    let accept = match accept.map(str::trim) {
        None | Some("") => return true,
        Some(accept) => accept,
    };

    accept
        .split(',')
        .filter_map(|range| range.split(';').next())
        .map(str::trim)
        .any(|range| matches!(range, "*/*" | "application/*" | "application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "/status";

    fn get(uri: &str, accept: Option<&str>) -> Result<Negotiated, Rejection> {
        negotiate(&Method::GET, &uri.parse().unwrap(), accept, PATH)
    }

    #[test]
    fn test_default_is_simple_json() {
        let negotiated = get("/status", None).unwrap();
        assert_eq!(negotiated.format, Format::Json);
        assert_eq!(negotiated.options, RenderOptions::default());
    }

    #[test]
    fn test_suffix_selects_format() {
        assert_eq!(get("/status.json", None).unwrap().format, Format::Json);
        assert_eq!(get("/status.jsonp", None).unwrap().format, Format::Jsonp);
        assert_eq!(get("/status.xml", None).unwrap().format, Format::Xml);
    }

    #[test]
    fn test_exact_accept_overrides_suffix() {
        assert_eq!(get("/status.json", Some("text/xml")).unwrap().format, Format::Xml);
        assert_eq!(get("/status.txt", Some("application/json")).unwrap().format, Format::Json);
        assert_eq!(
            get("/status", Some("application/javascript")).unwrap().format,
            Format::Jsonp
        );
    }

    #[test]
    fn test_inexact_accept_does_not_override_suffix() {
        assert_eq!(
            get("/status.xml", Some("application/json, text/plain")).unwrap().format,
            Format::Xml
        );
    }

    #[test]
    fn test_wrong_method() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let result = negotiate(&method, &"/status".parse().unwrap(), None, PATH);
            assert_eq!(result, Err(Rejection::MethodNotAllowed));
        }
    }

    #[test]
    fn test_wrong_path() {
        assert_eq!(get("/other", None), Err(Rejection::NotFound));
        assert_eq!(get("/other.json", None), Err(Rejection::NotFound));
        assert_eq!(get("/status/extra", None), Err(Rejection::NotFound));
        assert_eq!(get("/", None), Err(Rejection::NotFound));
    }

    #[test]
    fn test_unknown_format() {
        assert_eq!(get("/status.txt", None), Err(Rejection::NotAcceptable));
        assert_eq!(get("/status.", None), Err(Rejection::NotAcceptable));
        assert_eq!(get("/status", Some("text/plain")), Err(Rejection::NotAcceptable));
    }

    #[test]
    fn test_browser_accept_gets_default() {
        let accept = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
        assert_eq!(get("/status", Some(accept)).unwrap().format, Format::Json);
        assert_eq!(
            get("/status", Some("application/json; charset=utf-8")).unwrap().format,
            Format::Json
        );
    }

    #[test]
    fn test_callback_upgrades_json() {
        let negotiated = get("/status.json?callback=cb", None).unwrap();
        assert_eq!(negotiated.format, Format::Jsonp);
        assert_eq!(negotiated.options.callback, "cb");

        let negotiated = get("/status?jsonp=fn", None).unwrap();
        assert_eq!(negotiated.format, Format::Jsonp);
        assert_eq!(negotiated.options.callback, "fn");
    }

    #[test]
    fn test_callback_wins_over_jsonp() {
        let negotiated = get("/status?jsonp=second&callback=first", None).unwrap();
        assert_eq!(negotiated.options.callback, "first");
    }

    #[test]
    fn test_jsonp_suffix_without_callback() {
        let negotiated = get("/status.jsonp", None).unwrap();
        assert_eq!(negotiated.format, Format::Jsonp);
        assert_eq!(negotiated.options.callback, "");
    }

    #[test]
    fn test_callback_with_xml_is_bad_request() {
        let result = get("/status.xml?callback=cb", None);
        assert_eq!(result, Err(Rejection::CallbackConflict));
        assert_eq!(Rejection::CallbackConflict.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_verbose_flag() {
        assert_eq!(
            get("/status?verbose", None).unwrap().options.verbosity,
            Verbosity::Verbose
        );
        assert_eq!(
            get("/status?verbose=0", None).unwrap().options.verbosity,
            Verbosity::Verbose
        );
        assert_eq!(
            get("/status?indent=2", None).unwrap().options.verbosity,
            Verbosity::Simple
        );
    }

    #[test]
    fn test_indent_option() {
        let negotiated = get("/status.json?indent=4&verbose", None).unwrap();
        assert_eq!(negotiated.options.indent.as_deref(), Some("4"));
        assert_eq!(negotiated.options.verbosity, Verbosity::Verbose);

        let negotiated = get("/status?indent=%09", None).unwrap();
        assert_eq!(negotiated.options.indent.as_deref(), Some("\t"));
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("/status.json"), ("/status", Some("json")));
        assert_eq!(split_suffix("/status"), ("/status", None));
        assert_eq!(split_suffix("/v1.0/status"), ("/v1.0/status", None));
        assert_eq!(split_suffix("/a.b.xml"), ("/a.b", Some("xml")));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Rejection::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(Rejection::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Rejection::NotAcceptable.status_code(), StatusCode::NOT_ACCEPTABLE);
    }
}
