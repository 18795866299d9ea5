//! Binary form of a node, for caching and transferring queries.
//!
//! The payload is a JSON envelope carrying a format version. Operators are
//! stored by their stable code, so reordering the [`Operator`] enum does not
//! break stored nodes.
//!
//! [`Operator`]: super::Operator

use super::Node;
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

const VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    node: &'a Node,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    node: serde_json::Value,
}

pub fn encode(node: &Node) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&EnvelopeRef {
        version: VERSION,
        node,
    })?)
}

pub fn decode(bytes: &[u8]) -> Result<Node> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    if envelope.version != VERSION {
        return Err(Error::invalid_statement(format!(
            "unsupported node encoding version {}",
            envelope.version
        )));
    }
    serde_json::from_value(envelope.node)
        .map_err(|err| Error::invalid_statement(format!("malformed node: {err}")))
}
