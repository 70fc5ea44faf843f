use minrust_core::loader::{STATUS_ERROR, STATUS_OK, STATUS_PANIC};
use minrust_core::{NativeApi, NativeToolbox, Origin, Toolbox, ToolboxError, ABI_VERSION};

fn in_process_api() -> NativeApi {
    unsafe {
        NativeApi::from_raw_parts(
            minrust_native::minrust_abi_version,
            minrust_native::minrust_add,
            minrust_native::minrust_process_string,
            minrust_native::minrust_might_panic,
            minrust_native::minrust_string_free,
        )
    }
}

fn in_process_toolbox() -> NativeToolbox {
    let api = in_process_api();
    api.check_abi().expect("in-process native crate shares the ABI revision");
    NativeToolbox::with_backend(api)
}

#[test]
fn host_and_native_agree_on_abi_constants() {
    assert_eq!(ABI_VERSION, minrust_native::ABI_VERSION);
    assert_eq!(STATUS_OK, minrust_native::STATUS_OK);
    assert_eq!(STATUS_ERROR, minrust_native::STATUS_ERROR);
    assert_eq!(STATUS_PANIC, minrust_native::STATUS_PANIC);
    assert_eq!(in_process_api().abi_version(), ABI_VERSION);
}

#[test]
fn ready_toolbox_delegates_to_native_side() {
    let toolbox = in_process_toolbox();
    assert!(toolbox.is_ready());
    assert_eq!(toolbox.add(5, 3), Ok(8));
    assert_eq!(
        toolbox.process_string("Hello from host!").as_deref(),
        Ok("[RUST] Hello from host!")
    );
    assert_eq!(toolbox.might_panic(false), Ok(()));
}

#[test]
fn native_panic_becomes_typed_error_and_toolbox_stays_usable() {
    let toolbox = in_process_toolbox();

    let err = toolbox
        .might_panic(true)
        .expect_err("native panic must surface as an error");
    assert!(err.is_panic());
    assert_eq!(err.origin(), Origin::Native);
    assert_eq!(err.operation(), Some("might_panic"));
    assert!(err.to_string().starts_with("[native] might_panic panicked"));

    assert_eq!(toolbox.add(2, 2), Ok(4));
    assert_eq!(toolbox.might_panic(false), Ok(()));
}

#[test]
fn native_reported_error_is_distinct_from_panic() {
    let toolbox = in_process_toolbox();
    let err = toolbox
        .add(i32::MAX, 1)
        .expect_err("overflow is reported by the native side");
    match &err {
        ToolboxError::Native { operation, message } => {
            assert_eq!(*operation, "add");
            assert!(message.contains("overflow"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_panic());
    assert!(err.is_retryable());
}

#[test]
fn unicode_text_round_trips_through_native_side() {
    let toolbox = in_process_toolbox();
    assert_eq!(
        toolbox.process_string("héllo, 世界").as_deref(),
        Ok("[RUST] héllo, 世界")
    );
    assert_eq!(toolbox.process_string("").as_deref(), Ok("[RUST] "));
}

#[test]
fn trait_object_consumers_see_the_same_contract() {
    let toolbox = in_process_toolbox();
    let consumer: &dyn Toolbox = &toolbox;
    assert!(consumer.is_ready());
    assert_eq!(consumer.add(-7, 7), Ok(0));
    assert!(consumer
        .might_panic(true)
        .expect_err("panic is reported")
        .is_panic());
}
