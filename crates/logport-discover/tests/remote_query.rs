//! Remote query behavior against an in-process collector speaking the
//! newline-delimited JSON protocol.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use serde_json::{json, Value};

use logport_core::LogportError;
use logport_discover::{
    query_remote_ports, CollectorClient, HostLocality, LoggerId, Selector, TcpCollector,
};

/// Canned collector: answers lookup/desc from fixed values, fetch from the
/// given payload, and instance-name from the given table.
fn spawn_collector(fetch_payload: Value, names: Vec<(i64, &'static str)>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            serve(stream, &fetch_payload, &names);
        }
    });

    port
}

fn serve(stream: TcpStream, fetch_payload: &Value, names: &[(i64, &'static str)]) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone should succeed"));
    let mut writer = stream;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }

        let request: Value = match serde_json::from_str(line.trim_end()) {
            Ok(request) => request,
            Err(_) => return,
        };

        let response = respond(&request, fetch_payload, names);
        let mut frame = response.to_string();
        frame.push('\n');
        if writer.write_all(frame.as_bytes()).is_err() {
            return;
        }
    }
}

fn respond(request: &Value, fetch_payload: &Value, names: &[(i64, &'static str)]) -> Value {
    let command = request["command"].as_str().unwrap_or_default();
    match command {
        "lookup-name" => ok(json!({ "id": 42 })),
        "lookup-desc" => ok(json!({ "indom": 7 })),
        "fetch" => ok(fetch_payload.clone()),
        "instance-name" => {
            let inst = request["payload"]["inst"].as_i64().unwrap_or(i64::MIN);
            match names.iter().find(|(known, _)| *known == inst) {
                Some((_, name)) => ok(json!({ "name": name })),
                None => error("NO_SUCH_INSTANCE", "no such instance"),
            }
        }
        _ => error("UNKNOWN_COMMAND", "unknown command"),
    }
}

fn ok(payload: Value) -> Value {
    json!({ "version": 1, "status": "ok", "payload": payload })
}

fn error(code: &str, message: &str) -> Value {
    json!({
        "version": 1,
        "status": "error",
        "error": { "code": code, "message": message }
    })
}

fn fetch_of(values: &[(i64, i64)]) -> Value {
    json!({
        "numval": values.len(),
        "values": values
            .iter()
            .map(|(inst, value)| json!({ "inst": inst, "value": value }))
            .collect::<Vec<_>>(),
    })
}

#[test]
fn all_selector_decodes_every_advertised_logger() {
    // Instance 1 is the reserved legacy pseudo-instance and must vanish.
    let port = spawn_collector(
        fetch_of(&[(1, 0), (0, 4330), (1234, 4331)]),
        vec![(0, "primary"), (1234, "1234")],
    );

    let client = TcpCollector::new(port);
    let snapshot = query_remote_ports(&client, "127.0.0.1", &Selector::All).unwrap();

    assert_eq!(snapshot.source, HostLocality::Remote);
    assert_eq!(snapshot.ports.len(), 2);

    assert_eq!(snapshot.ports[0].owner, LoggerId::Primary);
    assert_eq!(snapshot.ports[0].port, 4330);
    assert_eq!(snapshot.ports[0].name, "primary");

    assert_eq!(snapshot.ports[1].owner, LoggerId::Pid(1234));
    assert_eq!(snapshot.ports[1].port, 4331);
    assert_eq!(snapshot.ports[1].name, "1234");
}

#[test]
fn exact_pid_selector_returns_exactly_one() {
    let port = spawn_collector(
        fetch_of(&[(0, 4330), (1234, 4331), (5678, 4332)]),
        vec![(0, "primary"), (1234, "1234"), (5678, "5678")],
    );

    let client = TcpCollector::new(port);
    let snapshot = query_remote_ports(&client, "127.0.0.1", &Selector::Pid(5678)).unwrap();

    assert_eq!(snapshot.ports.len(), 1);
    assert_eq!(snapshot.ports[0].owner, LoggerId::Pid(5678));
    assert_eq!(snapshot.ports[0].port, 4332);
}

#[test]
fn absent_pid_returns_empty_success() {
    let port = spawn_collector(fetch_of(&[(0, 4330)]), vec![(0, "primary")]);

    let client = TcpCollector::new(port);
    let snapshot = query_remote_ports(&client, "127.0.0.1", &Selector::Pid(4242)).unwrap();

    assert!(snapshot.ports.is_empty());
}

#[test]
fn instance_name_failure_aborts_the_query() {
    // 1234 is advertised but has no name in the instance domain.
    let port = spawn_collector(
        fetch_of(&[(0, 4330), (1234, 4331)]),
        vec![(0, "primary")],
    );

    let client = TcpCollector::new(port);
    let err = query_remote_ports(&client, "127.0.0.1", &Selector::All).unwrap_err();

    assert!(matches!(err, LogportError::InstanceLookupFailed { .. }));
}

#[test]
fn negative_value_count_is_malformed() {
    let port = spawn_collector(json!({ "numval": -12, "values": [] }), vec![]);

    let client = TcpCollector::new(port);
    let err = query_remote_ports(&client, "127.0.0.1", &Selector::All).unwrap_err();

    assert!(matches!(err, LogportError::ResultMalformed { .. }));
}

#[test]
fn connection_refused_is_connection_failed() {
    // Bind then drop to find a port nothing is listening on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = TcpCollector::new(port);
    let err = client.connect("127.0.0.1").unwrap_err();

    assert!(matches!(err, LogportError::ConnectionFailed { .. }));
}
