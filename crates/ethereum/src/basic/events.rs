use std::iter::FusedIterator;

use contract_core::{Error, Result};
use ethers::abi::RawLog;
use ethers::contract::{EthDisplay, EthEvent, EthLogDecode};
use ethers::types::{Log, U256};
use serde::Serialize;

/// ABI shape of the `ItemSet(string,uint256)` event
#[derive(Clone, Debug, Default, Eq, PartialEq, EthEvent, EthDisplay)]
#[ethevent(name = "ItemSet", abi = "ItemSet(string,uint256)")]
pub struct ItemSetFilter {
    pub key: String,
    pub value: U256,
}

/// An `ItemSet` event observed on chain, with the log it was decoded from
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BasicItemSet {
    pub key: String,
    pub value: U256,
    pub raw: Log,
}

/// Decode a raw log into an `ItemSet` event
pub fn parse_item_set(log: Log) -> Result<BasicItemSet> {
    let raw = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };
    let event = <ItemSetFilter as EthLogDecode>::decode_log(&raw).map_err(|e| {
        Error::decode(format!(
            "ItemSet from tx {:?} log {:?}: {}",
            log.transaction_hash, log.log_index, e
        ))
    })?;

    Ok(BasicItemSet {
        key: event.key,
        value: event.value,
        raw: log,
    })
}

/// Iterator over the `ItemSet` events of a finished log query.
///
/// Yields the first decode failure and then stops.
#[derive(Debug)]
pub struct BasicItemSetIterator {
    logs: std::vec::IntoIter<Log>,
    failed: bool,
}

impl BasicItemSetIterator {
    pub(crate) fn new(logs: Vec<Log>) -> Self {
        Self {
            logs: logs.into_iter(),
            failed: false,
        }
    }
}

impl Iterator for BasicItemSetIterator {
    type Item = Result<BasicItemSet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let event = parse_item_set(self.logs.next()?);
        self.failed = event.is_err();
        Some(event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.logs.len()))
        }
    }
}

impl FusedIterator for BasicItemSetIterator {}
