//! Per-call options for the contract bindings

use std::time::Duration;

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockId, BlockNumber, U256};

/// Options for read-only contract calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOpts {
    /// Account the call is made from
    pub from: Option<Address>,
    /// Block to execute against, latest when absent
    pub block: Option<BlockId>,
    /// Execute against the pending state (takes precedence over `block`)
    pub pending: bool,
}

impl CallOpts {
    /// Block the call is executed against, if one was pinned
    pub fn block_id(&self) -> Option<BlockId> {
        if self.pending {
            Some(BlockId::Number(BlockNumber::Pending))
        } else {
            self.block
        }
    }

    pub(crate) fn apply(&self, tx: &mut TypedTransaction) {
        if let Some(from) = self.from {
            tx.set_from(from);
        }
    }
}

/// Options for state-changing transactions.
///
/// Fields left unset are filled by the middleware stack (nonce, gas estimate, gas price).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactOpts {
    /// Sending account
    pub from: Option<Address>,
    /// Explicit nonce
    pub nonce: Option<U256>,
    /// Gas limit
    pub gas_limit: Option<U256>,
    /// Gas price in wei
    pub gas_price: Option<U256>,
    /// Value transferred with the transaction in wei
    pub value: U256,
}

impl TransactOpts {
    pub(crate) fn apply(&self, tx: &mut TypedTransaction) {
        if let Some(from) = self.from {
            tx.set_from(from);
        }
        if let Some(nonce) = self.nonce {
            tx.set_nonce(nonce);
        }
        if let Some(gas_limit) = self.gas_limit {
            tx.set_gas(gas_limit);
        }
        if let Some(gas_price) = self.gas_price {
            tx.set_gas_price(gas_price);
        }
        tx.set_value(self.value);
    }
}

/// Block range for past event queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOpts {
    /// First block of the range
    pub start: u64,
    /// Last block of the range, latest when absent
    pub end: Option<u64>,
}

/// Options for live event subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOpts {
    /// First block to deliver events from, the current head when absent
    pub start: Option<u64>,
    /// How often the node-side filter is polled
    pub poll_interval: Duration,
}

impl Default for WatchOpts {
    fn default() -> Self {
        Self {
            start: None,
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::TransactionRequest;

    #[test]
    fn test_pending_overrides_block() {
        let opts = CallOpts {
            block: Some(BlockId::Number(BlockNumber::Number(7.into()))),
            pending: true,
            ..Default::default()
        };
        assert_eq!(opts.block_id(), Some(BlockId::Number(BlockNumber::Pending)));

        let opts = CallOpts::default();
        assert_eq!(opts.block_id(), None);
    }

    #[test]
    fn test_transact_opts_fill_transaction() {
        let from = Address::repeat_byte(0x42);
        let opts = TransactOpts {
            from: Some(from),
            nonce: Some(3.into()),
            gas_limit: Some(1_600_000.into()),
            gas_price: Some(39_576_000_000u64.into()),
            value: 5.into(),
        };

        let mut tx: TypedTransaction = TransactionRequest::new().into();
        opts.apply(&mut tx);

        assert_eq!(tx.from(), Some(&from));
        assert_eq!(tx.nonce(), Some(&U256::from(3)));
        assert_eq!(tx.gas(), Some(&U256::from(1_600_000)));
        assert_eq!(tx.gas_price(), Some(U256::from(39_576_000_000u64)));
        assert_eq!(tx.value(), Some(&U256::from(5)));
    }

    #[test]
    fn test_unset_transact_opts_leave_fields_to_middleware() {
        let mut tx: TypedTransaction = TransactionRequest::new().into();
        TransactOpts::default().apply(&mut tx);

        assert_eq!(tx.nonce(), None);
        assert_eq!(tx.gas(), None);
        assert_eq!(tx.gas_price(), None);
        assert_eq!(tx.value(), Some(&U256::zero()));
    }
}
