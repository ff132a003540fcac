#![allow(dead_code)]

use bitbus::{BoxError, HandlerRef, Mask};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Payloads
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    pub content: String,
}

pub fn payload(content: &str) -> Payload {
    Payload {
        content: content.to_string(),
    }
}

// ============================================================================
// Test Handlers
// ============================================================================

/// Shared log of `(handler name, payload content, code)` triples.
pub type CallLog = Arc<Mutex<Vec<(&'static str, String, u64)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A handler that appends its name to `log` on every call.
pub fn named(log: &CallLog, name: &'static str) -> HandlerRef<Payload> {
    let log = log.clone();
    HandlerRef::from_fn(move |data: &Payload, code: Mask| {
        log.lock()
            .unwrap()
            .push((name, data.content.clone(), code.bits()));
    })
}

/// A handler that logs its call, then fails.
pub fn failing(log: &CallLog, name: &'static str) -> HandlerRef<Payload> {
    let log = log.clone();
    HandlerRef::from_fn(move |data: &Payload, code: Mask| -> Result<(), BoxError> {
        log.lock()
            .unwrap()
            .push((name, data.content.clone(), code.bits()));
        Err(format!("{name} failed").into())
    })
}

pub fn names(log: &CallLog) -> Vec<&'static str> {
    log.lock().unwrap().iter().map(|(name, _, _)| *name).collect()
}
