//! Tests for preset and the three reset modes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use memo_core::{CallArgs, Class, Instance, MemoError, ResetTarget, Signature};

struct Fixture {
    obj: Instance<(), i64>,
    runs: Arc<AtomicUsize>,
}

fn fixture() -> Fixture {
    let runs = Arc::new(AtomicUsize::new(0));
    let class: Class<(), i64> = Class::new("Fixture");

    let c = Arc::clone(&runs);
    class
        .define("double", Signature::new().required("n"), move |_, args| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(args.int(0).unwrap_or_default() * 2)
        })
        .unwrap();

    let c = Arc::clone(&runs);
    class
        .define("zero", Signature::new(), move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        })
        .unwrap();

    let c = Arc::clone(&runs);
    class
        .define("plain", Signature::new(), move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(-1)
        })
        .unwrap();

    class.memoize_all(&["double", "zero"]).unwrap();
    Fixture {
        obj: class.instantiate(()),
        runs,
    }
}

fn n(v: i64) -> CallArgs {
    CallArgs::positional([v])
}

#[test]
fn test_preset_then_call_skips_body() {
    let f = fixture();
    f.obj.preset("double", n(10), || 99).unwrap();
    assert_eq!(f.obj.call("double", n(10)).unwrap(), 99);
    assert_eq!(f.runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_preset_zero_arg_method() {
    let f = fixture();
    f.obj.preset("zero", CallArgs::new(), || 5).unwrap();
    assert_eq!(f.obj.call("zero", CallArgs::new()).unwrap(), 5);
    assert_eq!(f.runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_preset_overwrites_computed_value() {
    let f = fixture();
    assert_eq!(f.obj.call("double", n(3)).unwrap(), 6);
    f.obj.preset("double", n(3), || 60).unwrap();
    assert_eq!(f.obj.call("double", n(3)).unwrap(), 60);
    assert_eq!(f.runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_preset_rejects_unmemoized_methods() {
    let f = fixture();
    assert_eq!(
        f.obj.preset("plain", CallArgs::new(), || 1),
        Err(MemoError::NotMemoized("plain".into()))
    );
    assert_eq!(
        f.obj.preset("missing", CallArgs::new(), || 1),
        Err(MemoError::NotMemoized("missing".into()))
    );
}

#[test]
fn test_try_preset_requires_producer() {
    let f = fixture();
    let none: Option<fn() -> i64> = None;
    assert_eq!(
        f.obj.try_preset("double", n(1), none),
        Err(MemoError::MissingValue("double".into()))
    );
    assert!(f.obj.try_preset("double", n(1), Some(|| 7)).is_ok());
    assert_eq!(f.obj.cached("double", &n(1)), Some(7));
}

#[test]
fn test_preset_does_not_validate_arguments() {
    let f = fixture();
    // Too many positionals for `double`; the key still uses the first one.
    f.obj
        .preset("double", CallArgs::positional([4i64, 5]), || 400)
        .unwrap();
    assert_eq!(f.obj.call("double", n(4)).unwrap(), 400);
}

#[test]
fn test_reset_entry_leaves_other_keys() {
    let f = fixture();
    f.obj.call("double", n(1)).unwrap();
    f.obj.call("double", n(2)).unwrap();

    assert_eq!(f.obj.reset(ResetTarget::Entry("double", n(1))).unwrap(), 1);
    assert!(!f.obj.is_cached("double", &n(1)));
    assert!(f.obj.is_cached("double", &n(2)));

    // Resetting an absent entry is not an error.
    assert_eq!(f.obj.reset(ResetTarget::Entry("double", n(1))).unwrap(), 0);
}

#[test]
fn test_reset_method_leaves_other_methods() {
    let f = fixture();
    f.obj.call("double", n(1)).unwrap();
    f.obj.call("double", n(2)).unwrap();
    f.obj.call("zero", CallArgs::new()).unwrap();

    assert_eq!(f.obj.reset(ResetTarget::Method("double")).unwrap(), 2);
    assert!(!f.obj.is_cached("double", &n(2)));
    assert!(f.obj.is_cached("zero", &CallArgs::new()));
}

#[test]
fn test_reset_all() {
    let f = fixture();
    f.obj.call("double", n(1)).unwrap();
    f.obj.call("zero", CallArgs::new()).unwrap();

    assert_eq!(f.obj.reset(ResetTarget::All).unwrap(), 2);
    assert_eq!(f.obj.cached_len(), 0);

    f.obj.call("double", n(1)).unwrap();
    assert_eq!(f.runs.load(Ordering::SeqCst), 3);
}

#[test]
fn test_reset_zero_arg_entry() {
    let f = fixture();
    f.obj.call("zero", CallArgs::new()).unwrap();
    assert_eq!(
        f.obj.reset(ResetTarget::Entry("zero", CallArgs::new())).unwrap(),
        1
    );
    assert!(!f.obj.is_cached("zero", &CallArgs::new()));
}

#[test]
fn test_reset_rejects_unmemoized_methods() {
    let f = fixture();
    assert_eq!(
        f.obj.reset(ResetTarget::Method("plain")),
        Err(MemoError::NotMemoized("plain".into()))
    );
    assert_eq!(
        f.obj.reset(ResetTarget::Entry("missing", n(1))),
        Err(MemoError::NotMemoized("missing".into()))
    );
}

#[test]
fn test_reset_memo_selects_mode_from_inputs() {
    let f = fixture();
    f.obj.call("double", n(1)).unwrap();
    f.obj.call("double", n(2)).unwrap();
    f.obj.call("zero", CallArgs::new()).unwrap();

    assert_eq!(f.obj.reset_memo(Some("double"), n(1)).unwrap(), 1);
    assert_eq!(f.obj.reset_memo(Some("double"), CallArgs::new()).unwrap(), 1);
    assert!(f.obj.is_cached("zero", &CallArgs::new()));
    assert_eq!(f.obj.reset_memo(None, CallArgs::new()).unwrap(), 1);
    assert_eq!(f.obj.cached_len(), 0);
}

#[test]
fn test_reset_memo_rejects_args_without_method() {
    let f = fixture();
    f.obj.call("double", n(1)).unwrap();
    assert_eq!(
        f.obj.reset_memo(None, n(1)),
        Err(MemoError::ArgsWithoutMethod)
    );
    assert_eq!(f.obj.cached_len(), 1);
}

#[test]
fn test_stats_count_presets_and_resets() {
    let f = fixture();
    f.obj.preset("double", n(1), || 1).unwrap();
    f.obj.reset(ResetTarget::All).unwrap();
    f.obj.reset(ResetTarget::Method("double")).unwrap();
    let stats = f.obj.stats();
    assert_eq!(stats.presets, 1);
    assert_eq!(stats.resets, 2);
}

fn adder() -> (Instance<(), i64>, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let class: Class<(), i64> = Class::new("Adder");
    class
        .define("add", Signature::new().required("a").required("b"), move |_, args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(args.int(0).unwrap_or_default() + args.int(1).unwrap_or_default())
        })
        .unwrap();
    class.memoize("add").unwrap();
    (class.instantiate(()), runs)
}

#[test]
fn test_preset_with_extra_positional_is_seen_by_call() {
    let (obj, runs) = adder();
    obj.preset("add", CallArgs::positional([1i64, 2, 3]), || 100).unwrap();
    assert_eq!(obj.call("add", CallArgs::positional([1i64, 2])).unwrap(), 100);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_preset_with_stray_keyword_is_seen_by_call() {
    let (obj, runs) = adder();
    obj.preset("add", CallArgs::positional([1i64, 2]).kwarg("x", 9i64), || 100)
        .unwrap();
    assert_eq!(obj.call("add", CallArgs::positional([1i64, 2])).unwrap(), 100);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert_eq!(obj.cached_len(), 1);
}

#[test]
fn test_entry_reset_with_extra_arguments_hits_call_entry() {
    let (obj, runs) = adder();
    obj.call("add", CallArgs::positional([1i64, 2])).unwrap();
    let removed = obj
        .reset(ResetTarget::Entry("add", CallArgs::positional([1i64, 2, 3])))
        .unwrap();
    assert_eq!(removed, 1);
    obj.call("add", CallArgs::positional([1i64, 2])).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
