use super::*;

#[test]
fn interning_is_idempotent() {
    let first = interner().try_intern("Foo");
    let second = interner().try_intern("Foo");
    assert_eq!(first, second);
}

#[test]
fn distinct_strings_get_distinct_slots() {
    let a = interner().try_intern("Alpha");
    let b = interner().try_intern("Beta");
    assert_ne!(a, b);
}

#[test]
fn empty_string_is_pre_interned() {
    assert_eq!(interner().try_intern(""), Ok((0, 0)));
    assert!(!interner().is_empty());
}

#[test]
fn lookup_returns_interned_text() {
    let (shard, local) = interner().try_intern("kotlinx").unwrap_or((0, 0));
    assert_eq!(interner().lookup(shard as usize, local as usize), "kotlinx");
}
