use std::collections::HashSet;
use std::sync::Arc;

use binary_json::oid::ObjectId;
use binary_json::Context;

#[test]
fn concurrent_generation_yields_distinct_ids() {
    let context = Arc::new(Context::builder().thread_safe(true).counter_seed(0).build());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let context = Arc::clone(&context);
            std::thread::spawn(move || {
                (0..1_000)
                    .map(|_| ObjectId::new_with_context(&context))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "duplicate ObjectId generated: {}", id);
        }
    }
    assert_eq!(seen.len(), 8_000);
}

#[test]
fn independent_contexts_have_independent_counters() {
    let a = Context::builder().counter_seed(5).build();
    let b = Context::builder().counter_seed(5).build();
    assert_eq!(
        ObjectId::new_with_context(&a).counter(),
        ObjectId::new_with_context(&b).counter()
    );
    ObjectId::new_with_context(&a);
    assert_eq!(ObjectId::new_with_context(&a).counter(), 7);
    assert_eq!(ObjectId::new_with_context(&b).counter(), 6);
}

#[test]
fn default_context_generation() {
    let a = ObjectId::new();
    let b = ObjectId::new();
    assert_ne!(a, b);
    assert_eq!(ObjectId::parse_str(a.to_hex()).unwrap(), a);
}

#[test]
fn hex_parsing_is_strict() {
    let valid = "0123456789abcdefABCDEF01";
    assert!(ObjectId::parse_str(valid).is_ok());

    for len in [0, 1, 12, 23, 25, 48] {
        let s: String = "a".repeat(len);
        assert!(ObjectId::parse_str(&s).is_err(), "length {} must fail", len);
    }
    assert!(ObjectId::parse_str("0123456789abcdefABCDEF0z").is_err());
    assert!(ObjectId::parse_str("0123456789abcdefABCDEF0 ").is_err());
}

#[test]
fn generated_ids_sort_by_timestamp_prefix() {
    struct TickingClock(std::sync::atomic::AtomicU32);

    impl binary_json::Clock for TickingClock {
        fn unix_time(&self) -> u32 {
            self.0.fetch_add(100, std::sync::atomic::Ordering::SeqCst)
        }
    }

    let context = Context::builder()
        .clock(TickingClock(std::sync::atomic::AtomicU32::new(1_000)))
        .counter_seed(0xFF_FFFF) // wrapping counter must not disturb the ordering
        .build();
    let ids: Vec<_> = (0..5)
        .map(|_| ObjectId::new_with_context(&context))
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(ids[0].timestamp(), 1_000);
    assert_eq!(ids[4].timestamp(), 1_400);
}
