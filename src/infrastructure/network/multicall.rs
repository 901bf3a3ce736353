// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::infrastructure::network::chain::ChainApi;
use alloy::primitives::{Address, Bytes};
use alloy::sol;
use alloy_sol_types::SolCall;
use std::sync::Arc;

sol! {
    struct Multicall3Call {
        address target;
        bool allowFailure;
        bytes callData;
    }

    struct Multicall3Result {
        bool success;
        bytes returnData;
    }

    function aggregate3(Multicall3Call[] calldata calls)
        external
        payable
        returns (Multicall3Result[] memory returnData);
}

/// One encoded contract read.
#[derive(Clone, Debug)]
pub struct Call {
    pub target: Address,
    pub payload: Bytes,
}

/// Outcome of one slot in an aggregate. `return_data` carries nothing
/// meaningful when `success` is false.
#[derive(Clone, Debug)]
pub struct CallResult {
    pub success: bool,
    pub return_data: Bytes,
}

/// Fans independent reads out through the Multicall3 contract so a refresh
/// tick costs one round trip instead of one per field.
pub struct BatchAggregator {
    chain: Arc<dyn ChainApi>,
    multicall_address: Address,
}

impl BatchAggregator {
    pub fn new(chain: Arc<dyn ChainApi>, multicall_address: Address) -> Self {
        Self {
            chain,
            multicall_address,
        }
    }

    /// Execute `calls` in a single `aggregate3` round trip.
    ///
    /// The output has exactly one entry per input call, in submission
    /// order. With `require_all_succeed` false (the normal mode), a
    /// reverting call marks its own slot `success=false` without aborting
    /// the batch; with it true, any revert fails the whole aggregate.
    pub async fn aggregate(
        &self,
        calls: &[Call],
        require_all_succeed: bool,
    ) -> Result<Vec<CallResult>, AppError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let batch: Vec<Multicall3Call> = calls
            .iter()
            .map(|call| Multicall3Call {
                target: call.target,
                allowFailure: !require_all_succeed,
                callData: call.payload.clone(),
            })
            .collect();
        let submitted = batch.len();

        let calldata = aggregate3Call { calls: batch }.abi_encode();
        let raw = self
            .chain
            .call(self.multicall_address, calldata.into())
            .await?;

        let decoded = aggregate3Call::abi_decode_returns(&raw)
            .map_err(|e| AppError::Rpc(format!("aggregate3 decode failed: {e}")))?;
        if decoded.len() != submitted {
            return Err(AppError::Rpc(format!(
                "aggregate3 arity mismatch: sent {submitted}, got {}",
                decoded.len()
            )));
        }

        Ok(decoded
            .into_iter()
            .map(|slot| CallResult {
                success: slot.success,
                return_data: slot.returnData,
            })
            .collect())
    }
}

/// Decode one slot's return data, or `None` when the slot failed or the
/// payload does not decode. Never errors: one malformed field must not
/// poison the rest of a batch.
pub fn decode_or_null<C: SolCall>(result: &CallResult) -> Option<C::Return> {
    if !result.success {
        return None;
    }
    C::abi_decode_returns(&result.return_data).ok()
}
