//! Remote port query.
//!
//! A collector advertises every logger it knows about through one well-known
//! metric whose instance domain maps instance ids to logger names. Decoding
//! that metric's value set yields the same records a local scan would have
//! produced on the collector's host.

use logport_core::{LogportError, LogportResult};

use crate::collector::CollectorSession;
use crate::{
    LoggerId, PortRecord, Selector, LOGGER_PORT_METRIC, PRIMARY_INSTANCE, RESERVED_LEGACY_INST,
};

/// Decode the well-known port metric into port records.
///
/// Every protocol step that can fail surfaces its own error; none of them
/// are retried. An instance-name lookup failure aborts the whole query: it
/// means the collector's instance domain is inconsistent, not that one entry
/// is missing.
pub(crate) fn query_remote<S: CollectorSession>(
    session: &mut S,
    selector: &Selector,
) -> LogportResult<Vec<PortRecord>> {
    let metric = session.lookup_name(LOGGER_PORT_METRIC)?;
    let desc = session.lookup_desc(metric)?;
    let set = session.fetch(metric)?;

    if set.numval < 0 {
        return Err(LogportError::result_malformed(format!(
            "collector reported value count {}",
            set.numval
        )));
    }

    let mut records = Vec::with_capacity(if selector.is_single() {
        1
    } else {
        set.values.len()
    });

    for value in &set.values {
        if value.inst == RESERVED_LEGACY_INST {
            continue;
        }

        let owner = owner_from_instance(value.inst)?;
        if !selector.matches(owner) {
            continue;
        }

        let port = decode_port(value.inst, value.value)?;
        let name = session.instance_name(desc.indom, value.inst)?;

        records.push(PortRecord {
            owner,
            port,
            name,
            collector_host: None,
            archive_path: None,
        });

        if selector.is_single() {
            break;
        }
    }

    Ok(records)
}

/// Map an instance id onto the owning logger's identity.
fn owner_from_instance(inst: i32) -> LogportResult<LoggerId> {
    if inst == PRIMARY_INSTANCE {
        Ok(LoggerId::Primary)
    } else if inst > 0 {
        Ok(LoggerId::Pid(inst as u32))
    } else {
        Err(LogportError::result_malformed(format!(
            "instance id {} outside the logger domain",
            inst
        )))
    }
}

fn decode_port(inst: i32, value: i64) -> LogportResult<u16> {
    u16::try_from(value)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| {
            LogportError::result_malformed(format!(
                "instance {} advertises port {} outside 1-65535",
                inst, value
            ))
        })
}
