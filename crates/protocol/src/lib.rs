// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Command-surface protocol for the molt migration engine
//!
//! Serializable request/response pairs for the remotely invocable
//! operations, plus the length-prefixed wire helpers. Transport and
//! dispatch live with the caller.

mod protocol;
mod wire;

pub use protocol::{Request, Response};
pub use wire::{
    decode, encode, read_message, read_request, write_message, write_response, ProtocolError,
    DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};
