//! Blocking TCP client for the collector protocol.
//!
//! Frames are newline-delimited JSON, one object per line:
//!
//! ```json
//! // Request
//! {"version":1,"command":"lookup-name","payload":{"metric":"collector.logger.port"}}
//! // Response
//! {"version":1,"status":"ok","payload":{"id":42}}
//! ```
//!
//! A session holds one connection and issues request/response exchanges in
//! sequence. All I/O is blocking with no internal timeout or retry; callers
//! needing bounded latency wrap calls with an external mechanism.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use logport_core::{LogportError, LogportResult};

use crate::collector::{
    CollectorClient, CollectorSession, InstanceValue, MetricDesc, MetricId, ValueSet,
};
use crate::DEFAULT_COLLECTOR_PORT;

/// Protocol version for the collector JSON protocol.
pub const PROTOCOL_VERSION: u32 = 1;

/// Collector client connecting over TCP.
#[derive(Debug, Clone)]
pub struct TcpCollector {
    port: u16,
}

impl TcpCollector {
    /// Client for collectors listening on the given TCP port.
    pub fn new(port: u16) -> Self {
        TcpCollector { port }
    }
}

impl Default for TcpCollector {
    fn default() -> Self {
        TcpCollector::new(DEFAULT_COLLECTOR_PORT)
    }
}

impl CollectorClient for TcpCollector {
    type Session = TcpSession;

    fn connect(&self, host: &str) -> LogportResult<TcpSession> {
        let stream = TcpStream::connect((host, self.port))
            .map_err(|e| LogportError::connection_failed(host, e))?;
        Ok(TcpSession {
            stream: BufReader::new(stream),
        })
    }
}

/// One open collector connection. Dropping it closes the connection.
#[derive(Debug)]
pub struct TcpSession {
    stream: BufReader<TcpStream>,
}

// ============================================================================
// Wire Types
// ============================================================================

/// A request sent to the collector.
#[derive(Serialize)]
struct WireRequest<'a, T: Serialize> {
    version: u32,
    command: &'a str,
    payload: T,
}

/// A response received from the collector.
#[derive(Deserialize)]
struct WireResponse {
    version: u32,
    /// `"ok"` on success, `"error"` on failure.
    status: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<WireError>,
}

/// Error details returned by the collector on failure.
#[derive(Debug, Deserialize)]
struct WireError {
    code: String,
    message: String,
}

#[derive(Serialize)]
struct LookupNameParams<'a> {
    metric: &'a str,
}

#[derive(Serialize)]
struct MetricParams {
    id: u32,
}

#[derive(Serialize)]
struct InstanceNameParams {
    indom: u32,
    inst: i32,
}

#[derive(Deserialize)]
struct LookupNameReply {
    id: u32,
}

#[derive(Deserialize)]
struct DescReply {
    indom: u32,
}

#[derive(Deserialize)]
struct FetchReply {
    numval: i32,
    #[serde(default)]
    values: Vec<InstanceValue>,
}

#[derive(Deserialize)]
struct InstanceNameReply {
    name: String,
}

// ============================================================================
// Session
// ============================================================================

impl TcpSession {
    /// One request/response exchange. Failures come back as a detail string;
    /// the caller attaches the protocol step it was performing.
    fn exchange<P: Serialize, R: DeserializeOwned>(
        &mut self,
        command: &str,
        payload: P,
    ) -> Result<R, String> {
        let request = WireRequest {
            version: PROTOCOL_VERSION,
            command,
            payload,
        };
        let mut frame = serde_json::to_string(&request).map_err(|e| e.to_string())?;
        frame.push('\n');

        let stream = self.stream.get_mut();
        stream.write_all(frame.as_bytes()).map_err(|e| e.to_string())?;
        stream.flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        let n = self.stream.read_line(&mut line).map_err(|e| e.to_string())?;
        if n == 0 {
            return Err("collector closed the connection".to_string());
        }

        let response: WireResponse = serde_json::from_str(line.trim_end())
            .map_err(|e| format!("invalid response frame: {}", e))?;
        if response.version != PROTOCOL_VERSION {
            return Err(format!(
                "unexpected protocol version {}",
                response.version
            ));
        }
        if response.status != "ok" {
            return Err(match response.error {
                Some(err) => format!("{}: {}", err.code, err.message),
                None => "collector reported an unspecified error".to_string(),
            });
        }

        let payload = response
            .payload
            .ok_or_else(|| "response carried no payload".to_string())?;
        serde_json::from_value(payload).map_err(|e| format!("invalid response payload: {}", e))
    }
}

impl CollectorSession for TcpSession {
    fn lookup_name(&mut self, metric: &str) -> LogportResult<MetricId> {
        let reply: LookupNameReply = self
            .exchange("lookup-name", LookupNameParams { metric })
            .map_err(|detail| LogportError::metric_lookup_failed(metric, detail))?;
        Ok(MetricId(reply.id))
    }

    fn lookup_desc(&mut self, metric: MetricId) -> LogportResult<MetricDesc> {
        let reply: DescReply = self
            .exchange("lookup-desc", MetricParams { id: metric.0 })
            .map_err(|detail| {
                LogportError::descriptor_lookup_failed(format!("#{}", metric.0), detail)
            })?;
        Ok(MetricDesc { indom: reply.indom })
    }

    fn fetch(&mut self, metric: MetricId) -> LogportResult<ValueSet> {
        let reply: FetchReply = self
            .exchange("fetch", MetricParams { id: metric.0 })
            .map_err(|detail| LogportError::fetch_failed(format!("#{}", metric.0), detail))?;
        Ok(ValueSet {
            numval: reply.numval,
            values: reply.values,
        })
    }

    fn instance_name(&mut self, indom: u32, inst: i32) -> LogportResult<String> {
        let reply: InstanceNameReply = self
            .exchange("instance-name", InstanceNameParams { indom, inst })
            .map_err(|detail| LogportError::instance_lookup_failed(indom, inst, detail))?;
        Ok(reply.name)
    }
}
