//! Publish behaviour: overlap matching, dedup, ordering and failures.

use bitbus::{
    Dispatcher, HandlerRef, Mask,
    testing::{CountingHandler, FailingHandler, RecordingHandler},
};

mod common;
use common::{call_log, failing, named, names, payload, Payload};

#[test]
fn test_overlap_matrix() {
    let codes = [0b0000u32, 0b0001, 0b0010, 0b0011, 0b0101, 0b1000, 0b1111];

    for &registered in &codes {
        for &published in &codes {
            let counter = CountingHandler::new();
            let mut bus = Dispatcher::<()>::new();
            bus.on(registered, &counter.handler());
            bus.emit(published, &()).unwrap();

            let expected = usize::from(registered & published != 0);
            assert_eq!(
                counter.count(),
                expected,
                "registered {registered:#b}, published {published:#b}"
            );
        }
    }
}

#[test]
fn test_handler_on_several_bits_fires_once() {
    let recorder = RecordingHandler::<u32>::new();
    let mut bus = Dispatcher::new();
    bus.on(0b0111u32, &recorder.handler());

    bus.emit(0b0110u32, &9).unwrap();

    assert_eq!(recorder.calls(), vec![(9, Mask::new(0b0110))]);
}

#[test]
fn test_handlers_receive_full_code() {
    let log = call_log();
    let mut bus = Dispatcher::new();
    bus.on(0b0001u32, &named(&log, "low"));
    bus.on(0b1000u32, &named(&log, "high"));

    bus.emit(0b1001u32, &payload("x")).unwrap();

    let calls = log.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("low", "x".to_string(), 0b1001),
            ("high", "x".to_string(), 0b1001)
        ]
    );
}

#[test]
fn test_scenario_two_handlers_four_bits() {
    let log = call_log();
    let a = named(&log, "A");
    let b = named(&log, "B");

    let mut bus = Dispatcher::with_max_bits(4).unwrap();
    bus.on(0b0011u32, &a);
    bus.on(0b0100u32, &b);
    bus.emit(0b0101u32, &payload("X")).unwrap();

    let calls = log.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("A", "X".to_string(), 0b0101),
            ("B", "X".to_string(), 0b0101)
        ]
    );
}

#[test]
fn test_order_is_bit_then_insertion() {
    let log = call_log();
    let first = named(&log, "first");
    let second = named(&log, "second");
    let wide = named(&log, "wide");

    let mut bus = Dispatcher::new();
    bus.on(0b100u32, &first)
        .on(0b100u32, &second)
        .on(0b110u32, &wide);

    bus.emit(0b110u32, &payload("-")).unwrap();

    // `wide` is reached first on bit 1 and skipped on bit 2.
    assert_eq!(names(&log), vec!["wide", "first", "second"]);
}

#[test]
fn test_registration_order_of_same_bit_is_stable_across_emits() {
    let log = call_log();
    let handlers: Vec<_> = ["a", "b", "c"].into_iter().map(|n| named(&log, n)).collect();

    let mut bus = Dispatcher::new();
    for handler in &handlers {
        bus.on(1u32, handler);
    }
    bus.emit(1u32, &payload("1")).unwrap();
    bus.emit(1u32, &payload("2")).unwrap();

    assert_eq!(names(&log), vec!["a", "b", "c", "a", "b", "c"]);
}

#[test]
fn test_every_operation_returns_same_instance() {
    let counter = CountingHandler::new();
    let handler = counter.handler::<()>();
    let mut bus = Dispatcher::<()>::new();
    let original: *const Dispatcher<()> = &bus;

    assert!(std::ptr::eq(bus.on(1u32, &handler), original));
    assert!(std::ptr::eq(bus.once(2u32, &handler), original));
    assert!(std::ptr::eq(bus.emit(3u32, &()).unwrap(), original));
    assert!(std::ptr::eq(bus.remove(&handler), original));
    assert!(std::ptr::eq(bus.remove_group([&handler]), original));
    assert!(std::ptr::eq(bus.clear(), original));
}

#[test]
fn test_fluent_chain() {
    let counter = CountingHandler::new();
    let handler = counter.handler::<()>();
    let mut bus = Dispatcher::<()>::new();

    bus.on(0b01u32, &handler)
        .emit(0b01u32, &())
        .unwrap()
        .emit(0b10u32, &())
        .unwrap()
        .remove(&handler)
        .emit(0b01u32, &())
        .unwrap();

    assert_eq!(counter.count(), 1);
}

#[test]
fn test_bits_hint_limits_subscription() {
    let counter = CountingHandler::new();
    let handler = counter.handler::<()>();
    let mut bus = Dispatcher::<()>::new();

    bus.on_within(0b110u32, &handler, 2);

    assert!(bus.is_listening(&handler, 1));
    assert!(!bus.is_listening(&handler, 2));

    bus.emit(0b100u32, &()).unwrap();
    assert_eq!(counter.count(), 0);

    bus.emit(0b010u32, &()).unwrap();
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_bits_hint_limits_publish() {
    let counter = CountingHandler::new();
    let mut bus = Dispatcher::<()>::new();
    bus.on(0b100u32, &counter.handler());

    bus.emit_within(0b100u32, &(), 2).unwrap();
    assert_eq!(counter.count(), 0);

    bus.emit_within(0b100u32, &(), 3).unwrap();
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_bits_hint_above_capacity_is_clamped() {
    let counter = CountingHandler::new();
    let handler = counter.handler::<()>();
    let mut bus = Dispatcher::<()>::with_max_bits(4).unwrap();

    bus.on_within(u64::MAX, &handler, 1000);
    assert_eq!(bus.subscriptions(&handler), Mask::new(0b1111));

    bus.emit_within(u64::MAX, &(), 1000).unwrap();
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_bits_beyond_capacity_are_ignored() {
    let counter = CountingHandler::new();
    let handler = counter.handler::<()>();
    let mut bus = Dispatcher::<()>::with_max_bits(4).unwrap();

    bus.on(0b1_0000u32, &handler);
    assert!(bus.is_empty());

    bus.on(0b1_0001u32, &handler);
    bus.emit(0b1_0000u32, &()).unwrap();
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_top_bit_of_full_width_dispatcher() {
    let recorder = RecordingHandler::<()>::new();
    let mut bus = Dispatcher::with_max_bits(64).unwrap();
    bus.on(Mask::bit(63), &recorder.handler());

    bus.emit(1u64 << 63, &()).unwrap();

    assert_eq!(recorder.calls(), vec![((), Mask::bit(63))]);
}

#[test]
fn test_negative_code_selects_low_word() {
    let counter = CountingHandler::new();
    let mut bus = Dispatcher::<()>::with_max_bits(64).unwrap();
    bus.on(Mask::bit(40), &counter.handler());
    bus.on(Mask::bit(31), &counter.handler());

    bus.emit(-1i32, &()).unwrap();

    assert_eq!(counter.count(), 1);
}

#[test]
fn test_empty_code_is_noop() {
    let counter = CountingHandler::new();
    let mut bus = Dispatcher::<()>::new();
    bus.on(u32::MAX, &counter.handler());

    bus.emit(0u32, &()).unwrap();
    bus.emit(Mask::EMPTY, &()).unwrap();

    assert_eq!(counter.count(), 0);
}

#[test]
fn test_emit_without_handlers_is_noop() {
    let mut bus = Dispatcher::<Payload>::new();
    assert!(bus.emit(u32::MAX, &payload("nobody")).is_ok());
}

#[test]
fn test_handler_error_aborts_publish() {
    let log = call_log();
    let mut bus = Dispatcher::new();
    bus.on(0b001u32, &named(&log, "before"));
    bus.on(0b010u32, &failing(&log, "broken"));
    bus.on(0b010u32, &named(&log, "same-bit"));
    bus.on(0b100u32, &named(&log, "later-bit"));

    let err = bus.emit(0b111u32, &payload("p")).unwrap_err();

    assert_eq!(names(&log), vec!["before", "broken"]);
    assert_eq!(err.bit(), 1);
    assert_eq!(err.code(), Mask::new(0b111));
    assert_eq!(
        std::error::Error::source(&err).map(|s| s.to_string()),
        Some("broken failed".to_string())
    );
}

#[test]
fn test_dispatcher_usable_after_failure() {
    let refusing = FailingHandler::new("nope");
    let counter = CountingHandler::new();
    let broken = refusing.handler::<()>();

    let mut bus = Dispatcher::<()>::new();
    bus.on(1u32, &broken).on(1u32, &counter.handler());
    assert!(bus.emit(1u32, &()).is_err());
    assert_eq!(counter.count(), 0);

    bus.remove(&broken);
    bus.emit(1u32, &()).unwrap();
    assert_eq!(refusing.attempts(), 1);
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_struct_handlers_by_identity() {
    let counter = CountingHandler::new();
    let first = counter.handler::<()>();
    let second = counter.handler::<()>();

    let mut bus = Dispatcher::<()>::new();
    bus.on(0b1u32, &first).on(0b1u32, &second);
    bus.emit(0b1u32, &()).unwrap();

    // Two identities for one counter: both fire.
    assert_eq!(counter.count(), 2);
}

#[test]
fn test_bitflags_channels() {
    bitbus::bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Channel: u16 {
            const INPUT = 1 << 0;
            const NETWORK = 1 << 1;
            const TIMER = 1 << 2;
        }
    }

    let recorder = RecordingHandler::<&'static str>::new();
    let mut bus = Dispatcher::new();
    bus.on(Mask::from_flags(Channel::INPUT | Channel::NETWORK), &recorder.handler());

    bus.emit(Mask::from_flags(Channel::TIMER), &"tick").unwrap();
    bus.emit(Mask::from_flags(Channel::NETWORK), &"packet").unwrap();

    assert_eq!(recorder.payloads(), vec!["packet"]);
}

#[test]
fn test_unsized_payload() {
    let log = std::sync::Arc::new(std::sync::Mutex::new(String::new()));
    let sink = log.clone();
    let handler = HandlerRef::<str>::from_fn(move |data: &str, _| {
        sink.lock().unwrap().push_str(data);
    });

    let mut bus = Dispatcher::<str>::new();
    bus.on(1u32, &handler);
    bus.emit(1u32, "slice").unwrap();

    assert_eq!(*log.lock().unwrap(), "slice");
}
