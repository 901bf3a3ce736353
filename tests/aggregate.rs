// SPDX-License-Identifier: MIT
// Order/length invariants of the batch aggregator and slot-level failure
// isolation, with the multicall response crafted in-memory.

mod support;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy_sol_types::{SolCall, SolValue};
use raid_sync::domain::constants::MULTICALL3_ADDRESS;
use raid_sync::domain::error::AppError;
use raid_sync::network::multicall::{
    BatchAggregator, Call, Multicall3Result, aggregate3Call, decode_or_null,
};
use std::sync::Arc;
use support::MockChain;

sol! {
    function hitPoints() external view returns (uint256);
}

fn read_call(target_byte: u8) -> Call {
    Call {
        target: Address::repeat_byte(target_byte),
        payload: hitPointsCall {}.abi_encode().into(),
    }
}

fn slot(success: bool, value: u64) -> Multicall3Result {
    Multicall3Result {
        success,
        returnData: if success {
            U256::from(value).abi_encode().into()
        } else {
            Bytes::new()
        },
    }
}

#[tokio::test]
async fn five_calls_third_failing_keeps_order_and_length() {
    let chain = Arc::new(MockChain::new());
    let response = vec![
        slot(true, 1),
        slot(true, 2),
        slot(false, 0),
        slot(true, 4),
        slot(true, 5),
    ];
    chain.push_call(Ok(response.abi_encode().into()));

    let aggregator = BatchAggregator::new(chain.clone(), MULTICALL3_ADDRESS);
    let calls: Vec<Call> = (1u8..=5).map(read_call).collect();
    let results = aggregator
        .aggregate(&calls, false)
        .await
        .expect("batch survives a failing slot");

    assert_eq!(results.len(), 5);
    for (index, result) in results.iter().enumerate() {
        assert_eq!(result.success, index != 2, "only slot 2 fails");
    }
    assert_eq!(
        decode_or_null::<hitPointsCall>(&results[0]),
        Some(U256::from(1u64))
    );
    assert_eq!(decode_or_null::<hitPointsCall>(&results[2]), None);
    assert_eq!(
        decode_or_null::<hitPointsCall>(&results[4]),
        Some(U256::from(5u64))
    );
}

#[tokio::test]
async fn one_round_trip_to_the_multicall_contract() {
    let chain = Arc::new(MockChain::new());
    chain.push_call(Ok(vec![slot(true, 7), slot(true, 8)].abi_encode().into()));

    let aggregator = BatchAggregator::new(chain.clone(), MULTICALL3_ADDRESS);
    let calls = vec![read_call(1), read_call(2)];
    aggregator.aggregate(&calls, false).await.expect("batch ok");

    let recorded = chain.recorded_calls();
    assert_eq!(recorded.len(), 1, "N reads cost one network call");
    assert_eq!(recorded[0].0, MULTICALL3_ADDRESS);

    let request = aggregate3Call::abi_decode(&recorded[0].1).expect("well-formed aggregate3");
    assert_eq!(request.calls.len(), 2);
    assert_eq!(request.calls[0].target, Address::repeat_byte(1));
    assert!(request.calls[0].allowFailure);
}

#[tokio::test]
async fn require_all_succeed_disallows_slot_failure() {
    let chain = Arc::new(MockChain::new());
    chain.push_call(Ok(vec![slot(true, 7)].abi_encode().into()));

    let aggregator = BatchAggregator::new(chain.clone(), MULTICALL3_ADDRESS);
    aggregator
        .aggregate(&[read_call(1)], true)
        .await
        .expect("batch ok");

    let request =
        aggregate3Call::abi_decode(&chain.recorded_calls()[0].1).expect("well-formed aggregate3");
    assert!(!request.calls[0].allowFailure);
}

#[tokio::test]
async fn empty_batch_short_circuits_without_network() {
    let chain = Arc::new(MockChain::new());
    let aggregator = BatchAggregator::new(chain.clone(), MULTICALL3_ADDRESS);

    let results = aggregator.aggregate(&[], false).await.expect("empty ok");
    assert!(results.is_empty());
    assert!(chain.recorded_calls().is_empty());
}

#[tokio::test]
async fn arity_mismatch_is_a_protocol_error() {
    let chain = Arc::new(MockChain::new());
    chain.push_call(Ok(vec![slot(true, 7)].abi_encode().into()));

    let aggregator = BatchAggregator::new(chain, MULTICALL3_ADDRESS);
    let err = aggregator
        .aggregate(&[read_call(1), read_call(2)], false)
        .await
        .expect_err("short response must not be silently accepted");
    assert!(matches!(err, AppError::Rpc(msg) if msg.contains("arity")));
}

#[tokio::test]
async fn transport_failure_propagates() {
    let chain = Arc::new(MockChain::new());
    chain.push_call(Err(AppError::Rpc("connection reset by peer".into())));

    let aggregator = BatchAggregator::new(chain, MULTICALL3_ADDRESS);
    let err = aggregator
        .aggregate(&[read_call(1)], false)
        .await
        .expect_err("transport errors surface to the caller");
    assert!(matches!(err, AppError::Rpc(_)));
}
