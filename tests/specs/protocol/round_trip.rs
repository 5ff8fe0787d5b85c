// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-surface operations round-tripping over the wire format.

use crate::prelude::*;
use molt_connectors::MemoryConnector;
use molt_core::{CancelToken, EngineConfig, Schema};
use molt_engine::{check_destructive, plan, ExecutionMode};
use molt_protocol::{decode, encode, read_message, write_message, Request, Response};

async fn round_trip_over_wire(request: &Request) -> Request {
    let (mut client, mut server) = tokio::io::duplex(1 << 20);
    let bytes = encode(request).unwrap();
    write_message(&mut client, &bytes).await.unwrap();
    let received = read_message(&mut server).await.unwrap();
    decode(&received).unwrap()
}

#[tokio::test]
async fn compute_plan_request_and_response_round_trip() {
    let current = schema_of(vec![top()]);
    let desired = schema_of(vec![top(), middle()]);

    let request = Request::ComputePlan {
        current: current.clone(),
        desired: desired.clone(),
    };
    let Request::ComputePlan { current, desired } = round_trip_over_wire(&request).await else {
        panic!("request changed shape over the wire");
    };

    // Serve the request the way a dispatcher would.
    let computed = plan(&current, &desired).unwrap();
    let response = Response::Plan {
        warnings: check_destructive(&computed),
        plan: computed,
    };
    let json = encode(&response).unwrap();
    let parsed: Response = decode(&json).unwrap();
    assert_eq!(parsed, response);
}

#[tokio::test]
async fn apply_plan_request_drives_the_executor() {
    let desired = schema_of(vec![top()]);
    let computed = plan(&Schema::empty(), &desired).unwrap();

    let request = Request::ApplyPlan {
        plan: computed,
        dry_run: false,
        allow_destructive: false,
    };
    let Request::ApplyPlan { plan, dry_run, .. } = round_trip_over_wire(&request).await else {
        panic!("request changed shape over the wire");
    };
    assert!(!dry_run);

    let connector = MemoryConnector::default();
    let (mut executor, _dir) = executor_for(connector, EngineConfig::default());
    let report = executor
        .apply(&plan, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();

    // The report itself is a serializable response payload.
    let response = Response::Report { report };
    let bytes = encode(&response).unwrap();
    let parsed: Response = decode(&bytes).unwrap();
    assert_eq!(parsed, response);
}

#[tokio::test]
async fn list_history_response_carries_entries() {
    let desired = schema_of(vec![top()]);
    let computed = plan(&Schema::empty(), &desired).unwrap();

    let connector = MemoryConnector::default();
    let (mut executor, _dir) = executor_for(connector, EngineConfig::default());
    executor
        .apply(&computed, ExecutionMode::Apply, &CancelToken::new())
        .await
        .unwrap();

    let response = Response::History {
        entries: executor.history().entries().to_vec(),
    };
    let bytes = encode(&response).unwrap();
    let Response::History { entries } = decode(&bytes).unwrap() else {
        panic!("response changed shape over the wire");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].checksum, computed.checksum());
}
