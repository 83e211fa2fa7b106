//! Gas accounting attached to join-point requests.

use serde::{Deserialize, Serialize};

/// Gas counters of a join-point request.
///
/// Every request is created with its own zeroed `GasInfo`. The execution engine fills it in as
/// the transaction or block progresses; requests never share counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasInfo {
    /// Gas requested by the transaction(s)
    pub gas_wanted: u64,
    /// Gas consumed so far
    pub gas_used: u64,
    /// Gas available to the Aspect
    pub gas: u64,
}

impl GasInfo {
    /// Creates zeroed counters.
    pub const fn new() -> Self {
        Self { gas_wanted: 0, gas_used: 0, gas: 0 }
    }

    /// Returns `true` if all counters are zero.
    pub const fn is_zero(&self) -> bool {
        self.gas_wanted == 0 && self.gas_used == 0 && self.gas == 0
    }

    /// Adds the counters of `other`, saturating at `u64::MAX`. Used to sum per-transaction gas
    /// into the block-level record.
    pub fn accumulate(&mut self, other: Self) {
        self.gas_wanted = self.gas_wanted.saturating_add(other.gas_wanted);
        self.gas_used = self.gas_used.saturating_add(other.gas_used);
        self.gas = self.gas.saturating_add(other.gas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut block = GasInfo::new();
        assert!(block.is_zero());

        block.accumulate(GasInfo { gas_wanted: 21_000, gas_used: 21_000, gas: 0 });
        block.accumulate(GasInfo { gas_wanted: 50_000, gas_used: 32_000, gas: 100 });
        assert_eq!(block, GasInfo { gas_wanted: 71_000, gas_used: 53_000, gas: 100 });

        block.accumulate(GasInfo { gas_wanted: u64::MAX, ..Default::default() });
        assert_eq!(block.gas_wanted, u64::MAX);
    }
}
