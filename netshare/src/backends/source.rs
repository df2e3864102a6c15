//! Source string parsing.
//!
//! A source has the form `[endpoint[:port]]/path`. An empty endpoint or a
//! zero port means "use the backend's configured default".

/// Connection parameters parsed out of a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSource {
    /// Empty when the source names no endpoint.
    pub endpoint: String,
    /// 0 when absent or unparsable.
    pub port: u16,
    /// Absolute remote path, always starting with `/`.
    pub path: String,
}

/// Parse `[endpoint[:port]]/path`.
///
/// An unparsable port is logged and treated as absent instead of failing.
pub fn parse_source(source: &str) -> ParsedSource {
    let (head, rest) = source.split_once('/').unwrap_or((source, ""));
    let path = format!("/{}", rest);

    if head.is_empty() {
        return ParsedSource {
            endpoint: String::new(),
            port: 0,
            path,
        };
    }

    let mut parts = head.split(':');
    let endpoint = parts.next().unwrap_or_default();
    let Some(port) = parts.next() else {
        return ParsedSource {
            endpoint: endpoint.to_string(),
            port: 0,
            path,
        };
    };

    let port = match port.parse::<u16>() {
        Ok(port) => port,
        Err(e) => {
            tracing::debug!(source = %source, "Invalid port number {}: {}", port, e);
            0
        }
    };

    ParsedSource {
        endpoint: endpoint.to_string(),
        port,
        path,
    }
}
