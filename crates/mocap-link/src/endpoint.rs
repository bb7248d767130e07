//! Connection endpoint descriptors
//!
//! Accepts both spellings seen in the field:
//!
//! | SDK URL form | `mavlink` crate form |
//! |--------------|----------------------|
//! | `udpin://0.0.0.0:14571` | `udpin:0.0.0.0:14571` |
//! | `udpout://10.0.0.2:14550` | `udpout:10.0.0.2:14550` |
//! | `tcpout://10.0.0.2:5760` | `tcpout:10.0.0.2:5760` |
//! | `serial:///dev/ttyACM0:57600` | `serial:/dev/ttyACM0:57600` |
//!
//! Legacy `udp://:14540` means "listen on 14540", `tcp://host:port` means "dial".

use std::fmt;
use std::str::FromStr;

use crate::LinkError;

const ANY_HOST: &str = "0.0.0.0";
const DEFAULT_BAUD: u32 = 57_600;
const DEFAULT_PORT: u16 = 14_571;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    UdpIn { host: String, port: u16 },
    UdpOut { host: String, port: u16 },
    UdpBroadcast { host: String, port: u16 },
    TcpIn { host: String, port: u16 },
    TcpOut { host: String, port: u16 },
    Serial { path: String, baud: u32 },
}

impl Endpoint {
    pub fn udp_in(port: u16) -> Self {
        Endpoint::UdpIn {
            host: ANY_HOST.to_string(),
            port,
        }
    }

    /// Address string understood by `mavlink::connect`
    pub fn to_mavlink_address(&self) -> String {
        match self {
            Endpoint::Serial { path, baud } => format!("serial:{}:{}", path, baud),
            Endpoint::UdpIn { host, port }
            | Endpoint::UdpOut { host, port }
            | Endpoint::UdpBroadcast { host, port }
            | Endpoint::TcpIn { host, port }
            | Endpoint::TcpOut { host, port } => format!("{}:{}:{}", self.scheme(), host, port),
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Endpoint::UdpIn { .. } => "udpin",
            Endpoint::UdpOut { .. } => "udpout",
            Endpoint::UdpBroadcast { .. } => "udpbcast",
            Endpoint::TcpIn { .. } => "tcpin",
            Endpoint::TcpOut { .. } => "tcpout",
            Endpoint::Serial { .. } => "serial",
        }
    }

    /// True when we wait for the remote side to send first
    pub fn is_inbound(&self) -> bool {
        matches!(self, Endpoint::UdpIn { .. } | Endpoint::TcpIn { .. })
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::udp_in(DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Serial { path, baud } => write!(f, "serial://{}:{}", path, baud),
            Endpoint::UdpIn { host, port }
            | Endpoint::UdpOut { host, port }
            | Endpoint::UdpBroadcast { host, port }
            | Endpoint::TcpIn { host, port }
            | Endpoint::TcpOut { host, port } => {
                write!(f, "{}://{}:{}", self.scheme(), host, port)
            }
        }
    }
}

impl FromStr for Endpoint {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| LinkError::InvalidEndpoint {
            endpoint: s.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = s.trim().split_once(':').ok_or_else(|| invalid("missing scheme"))?;
        let rest = rest.strip_prefix("//").unwrap_or(rest);

        if scheme == "serial" {
            let (path, baud) = match rest.rsplit_once(':') {
                Some((path, baud)) => (
                    path,
                    baud.parse::<u32>().map_err(|_| invalid("baud rate is not a number"))?,
                ),
                None => (rest, DEFAULT_BAUD),
            };
            if path.is_empty() {
                return Err(invalid("missing serial device"));
            }
            return Ok(Endpoint::Serial {
                path: path.to_string(),
                baud,
            });
        }

        let (host, port) = rest.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        let port = port.parse::<u16>().map_err(|_| invalid("port is not a number"))?;
        let inbound_host = || {
            if host.is_empty() {
                ANY_HOST.to_string()
            } else {
                host.to_string()
            }
        };
        let outbound_host = || {
            if host.is_empty() {
                Err(invalid("outbound endpoint needs a host"))
            } else {
                Ok(host.to_string())
            }
        };

        match scheme {
            "udp" | "udpin" => Ok(Endpoint::UdpIn {
                host: inbound_host(),
                port,
            }),
            "tcpin" => Ok(Endpoint::TcpIn {
                host: inbound_host(),
                port,
            }),
            "udpout" => Ok(Endpoint::UdpOut {
                host: outbound_host()?,
                port,
            }),
            "udpbcast" => Ok(Endpoint::UdpBroadcast {
                host: outbound_host()?,
                port,
            }),
            "tcp" | "tcpout" => Ok(Endpoint::TcpOut {
                host: outbound_host()?,
                port,
            }),
            _ => Err(invalid("unknown scheme")),
        }
    }
}
