use std::collections::HashMap;
use thiserror::Error;
use shared::protocol::{
    CONTACT_LABEL, HOST_LABEL, HOST_NAME_FIELD, INFO_LABEL, PROGRAM_LABEL, SERVICE_DESCRIPTION_FIELD,
    SERVICE_LABEL, SERVICES_FIELD,
};
use shared::types::{Block, FieldValue, HostRecord, Snapshot};
use super::parser::RawBlock;

/// Data-integrity problems that make a snapshot untrustworthy.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("service '{service_description}' references unknown host '{host_name}'")]
    DanglingService {
        host_name: String,
        service_description: String,
    },

    #[error("host '{0}' appears more than once")]
    DuplicateHost(String),

    #[error("host block #{0} has no host_name")]
    UnnamedHost(usize),

    #[error("host '{0}' has a field named 'services', which would clash with its service list")]
    ReservedHostField(String),
}

/// Link parsed blocks into a snapshot.
///
/// Hosts and services keep file order. Singleton sections keep their last
/// occurrence. Services are attached after all hosts are known, so a service
/// may appear before its host in the file.
pub fn assemble(blocks: Vec<RawBlock>) -> Result<Snapshot, AssembleError> {
    let mut snapshot = Snapshot::default();
    let mut services = Vec::new();
    let mut host_index: HashMap<String, usize> = HashMap::new();

    for RawBlock { kind, fields } in blocks {
        match kind.as_str() {
            HOST_LABEL => {
                let position = snapshot.hosts.len();
                let host_name = key_of(&fields).ok_or(AssembleError::UnnamedHost(position + 1))?;
                if fields.contains_key(SERVICES_FIELD) {
                    return Err(AssembleError::ReservedHostField(host_name));
                }
                if host_index.insert(host_name.clone(), position).is_some() {
                    return Err(AssembleError::DuplicateHost(host_name));
                }
                snapshot.hosts.push(HostRecord::new(fields));
            }
            SERVICE_LABEL => services.push(fields),
            INFO_LABEL => snapshot.info = Some(fields),
            PROGRAM_LABEL => snapshot.program = Some(fields),
            CONTACT_LABEL => snapshot.contact = Some(fields),
            other => tracing::trace!(section = other, "Ignoring status section"),
        }
    }

    for service in services {
        let host_name = key_of(&service);
        let position = host_name
            .as_ref()
            .and_then(|name| host_index.get(name))
            .copied();
        match position {
            Some(position) => snapshot.hosts[position].services.push(service),
            None => {
                return Err(AssembleError::DanglingService {
                    host_name: host_name.unwrap_or_default(),
                    service_description: service
                        .get(SERVICE_DESCRIPTION_FIELD)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                })
            }
        }
    }

    Ok(snapshot)
}

fn key_of(block: &Block) -> Option<String> {
    block.get(HOST_NAME_FIELD).and_then(FieldValue::key_text)
}
