//! Usage: Listen address parsing for the portal server.

pub(crate) const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";
pub(crate) const DEFAULT_LISTEN_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedListenAddress {
    pub(crate) host: String,
    pub(crate) port: Option<u16>,
}

impl ParsedListenAddress {
    pub(crate) fn bind_target(&self) -> String {
        format_host_port(&self.host, self.port.unwrap_or(DEFAULT_LISTEN_PORT))
    }
}

pub(crate) fn format_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

fn parse_port(raw: &str) -> Result<u16, String> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| format!("invalid listen port: {raw:?}"))
}

/// Accepts `host`, `host:port`, `[v6]` and `[v6]:port`. Port 0 asks the OS for a free port.
pub(crate) fn parse_listen_address(input: &str) -> Result<ParsedListenAddress, String> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(ParsedListenAddress {
            host: DEFAULT_LISTEN_HOST.to_string(),
            port: None,
        });
    }
    if raw.contains("://") || raw.contains('/') {
        return Err("listen address must be host or host:port".to_string());
    }

    if let Some(rest) = raw.strip_prefix('[') {
        let idx = rest
            .find(']')
            .ok_or_else(|| "invalid IPv6 address: missing closing ']'".to_string())?;
        let host = rest[..idx].trim();
        if host.is_empty() {
            return Err("listen address missing host".to_string());
        }
        let tail = rest[idx + 1..].trim();
        if tail.is_empty() {
            return Ok(ParsedListenAddress {
                host: host.to_string(),
                port: None,
            });
        }
        let port_raw = tail
            .strip_prefix(':')
            .ok_or_else(|| "listen address must be [ipv6]:port".to_string())?;
        return Ok(ParsedListenAddress {
            host: host.to_string(),
            port: Some(parse_port(port_raw)?),
        });
    }

    let parts: Vec<&str> = raw.split(':').collect();
    match parts.as_slice() {
        [host] => Ok(ParsedListenAddress {
            host: host.to_string(),
            port: None,
        }),
        [host, port_raw] => {
            let host = host.trim();
            if host.is_empty() {
                return Err("listen address missing host".to_string());
            }
            Ok(ParsedListenAddress {
                host: host.to_string(),
                port: Some(parse_port(port_raw)?),
            })
        }
        _ => Err("IPv6 must use [addr]:port".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_uses_loopback_default() {
        let parsed = parse_listen_address("  ").expect("parse");
        assert_eq!(parsed.host, "127.0.0.1");
        assert_eq!(parsed.port, None);
        assert_eq!(parsed.bind_target(), "127.0.0.1:3000");
    }

    #[test]
    fn host_and_port() {
        let parsed = parse_listen_address("0.0.0.0:8080").expect("parse");
        assert_eq!(parsed.host, "0.0.0.0");
        assert_eq!(parsed.port, Some(8080));
    }

    #[test]
    fn bracketed_ipv6() {
        let parsed = parse_listen_address("[::1]:0").expect("parse");
        assert_eq!(parsed.host, "::1");
        assert_eq!(parsed.port, Some(0));
        assert_eq!(parsed.bind_target(), "[::1]:0");

        let bare = parse_listen_address("[::]").expect("parse");
        assert_eq!(bare.bind_target(), "[::]:3000");
    }

    #[test]
    fn rejects_urls_and_bad_ports() {
        assert!(parse_listen_address("http://127.0.0.1:3000").is_err());
        assert!(parse_listen_address("127.0.0.1:http").is_err());
        assert!(parse_listen_address("127.0.0.1:70000").is_err());
        assert!(parse_listen_address("::1:3000").is_err());
        assert!(parse_listen_address(":3000").is_err());
        assert!(parse_listen_address("[::1").is_err());
    }
}
