use super::*;
use std::{
    convert::TryFrom,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

/// Where to find the certificate chain and private key for TLS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// PEM certificate chain (often cert.pem or fullchain.pem)
    pub cert_path: String,
    /// PEM private key (often key.pem or privkey.pem)
    pub key_path: String,
}

/// Parameters to create a server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    /// None to serve WebSockets over plain TCP
    pub tls: Option<TlsConfig>,
    pub limits: RelayLimits,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8443,
            tls: None,
            limits: RelayLimits::default(),
        }
    }
}

fn describe(source: Option<&str>) -> &str {
    source.unwrap_or("default value")
}

fn warn_tls_disabled(source: Option<&str>) {
    if let Some(source) = source {
        warn!("{} ignored because TLS is disabled", source);
    }
}

fn positive_size(value: i64, minimum: i64, source: Option<&str>) -> Result<usize, Box<dyn Error>> {
    if value < minimum {
        return Err(format!("{} is {}, must be at least {}", describe(source), value, minimum).into());
    }
    usize::try_from(value).map_err(|_| format!("{} is too large", describe(source)).into())
}

/// Applied in order of returned vec (NOT in the order the user specifies the entry). All entries are always applied.
pub fn server_config_entries() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::new_string(
            "address",
            "IP address to listen on",
            "0.0.0.0",
            |conf, address, source| {
                conf.server.bind_address = address.parse().map_err(|e| {
                    format!("{} {:?} is not an IP address: {}", describe(source), address, e)
                })?;
                Ok(())
            },
        ),
        ConfigEntry::new_int("port", "TCP port to listen on", 8443, |conf, port, source| {
            conf.server.port = match u16::try_from(port) {
                Ok(port) if port > 0 => port,
                _ => {
                    return Err(format!("{} {} is not a valid port", describe(source), port).into())
                }
            };
            Ok(())
        }),
        ConfigEntry::new_bool(
            "tls",
            concat!(
                "serve WebSockets over TLS.",
                " Disabling this is only suitable for development behind a trusted proxy"
            ),
            true,
            |conf, enable, _| {
                conf.server.tls = if enable {
                    Some(TlsConfig {
                        cert_path: String::new(),
                        key_path: String::new(),
                    })
                } else {
                    None
                };
                Ok(())
            },
        ),
        ConfigEntry::new_string(
            "cert",
            "path to the PEM certificate chain used for TLS",
            "/etc/ssl/certs/cert.pem",
            |conf, path, source| {
                match &mut conf.server.tls {
                    Some(tls) => tls.cert_path = path,
                    None => warn_tls_disabled(source),
                }
                Ok(())
            },
        ),
        ConfigEntry::new_string(
            "key",
            "path to the PEM private key used for TLS",
            "/etc/ssl/private/key.pem",
            |conf, path, source| {
                match &mut conf.server.tls {
                    Some(tls) => tls.key_path = path,
                    None => warn_tls_disabled(source),
                }
                Ok(())
            },
        ),
        ConfigEntry::new_int(
            "max_clients",
            "maximum number of simultaneous connections, further connections are refused",
            256,
            |conf, max, source| {
                conf.server.limits.max_clients = positive_size(max, 1, source)?;
                Ok(())
            },
        ),
        ConfigEntry::new_int(
            "buffer_size",
            concat!(
                "receive buffer size per connection in bytes.",
                " Also the largest upgrade request and frame a client may send"
            ),
            16 * 1024,
            |conf, size, source| {
                conf.server.limits.buffer_capacity = positive_size(size, 256, source)?;
                Ok(())
            },
        ),
        ConfigEntry::new_int(
            "max_outbound",
            "bytes that may be waiting to be sent to a single connection before it is dropped",
            1024 * 1024,
            |conf, size, source| {
                let minimum = conf.server.limits.buffer_capacity as i64;
                conf.server.limits.max_outbound = positive_size(size, minimum, source)?;
                Ok(())
            },
        ),
    ]
}
