//! 转发合约：实参打包形态、结果解包、无返回值与错误透传。
//!
//! 所有用例都通过 `#[spark_stub::interface]` 生成的转发桩驱动，断言 Invoker 实际收到的
//! `(分派键, 线路实参)`。

mod support;

use std::sync::Arc;

use serde_json::json;
use spark_stub::{
    Invoker, InvocationError, NamingConvention, StubCache, StubConfig, StubError, codes,
    invoker_fn,
};
use support::{Call, Ledger, Receipt, RecordingInvoker};

fn ledger(invoker: &Arc<RecordingInvoker>) -> Box<dyn Ledger> {
    StubCache::new()
        .create_instance::<dyn Ledger, _>(Arc::clone(invoker))
        .expect("ledger stub")
}

#[test]
fn nullary_method_sends_absent_argument() {
    let invoker = RecordingInvoker::replying(json!(42));
    let stub = ledger(&invoker);

    assert_eq!(stub.get_count().expect("getCount"), 42);
    assert_eq!(
        invoker.calls(),
        vec![Call {
            method: "getCount".to_owned(),
            argument: json!(null),
        }]
    );
}

#[test]
fn single_argument_is_sent_unwrapped() {
    let invoker = RecordingInvoker::replying(json!(-15));
    let stub = ledger(&invoker);

    assert_eq!(stub.balance("acc-1").expect("balance"), -15);
    let call = invoker.last().expect("one call");
    assert_eq!(call.method, "balance");
    assert_eq!(call.argument, json!("acc-1"));
}

#[test]
fn single_none_argument_is_sent_as_null() {
    let invoker = RecordingInvoker::replying(json!(null));
    let stub = ledger(&invoker);

    stub.audit(None).expect("audit");
    assert_eq!(invoker.last().expect("one call").argument, json!(null));
}

#[test]
fn multiple_arguments_are_keyed_by_parameter_name() {
    let invoker = RecordingInvoker::with(|_, argument| Ok(argument.clone()));
    let stub = ledger(&invoker);

    let receipt = stub.transfer("alice", "bob", 250).expect("transfer");
    assert_eq!(
        receipt,
        Receipt {
            from: "alice".to_owned(),
            to: "bob".to_owned(),
            cents: 250,
        }
    );
    assert_eq!(
        invoker.last().expect("one call").argument,
        json!({ "from": "alice", "to": "bob", "cents": 250 })
    );
}

#[test]
fn void_method_never_unpacks_the_result() {
    let invoker = RecordingInvoker::replying(json!({ "unexpected": ["payload"] }));
    let stub = ledger(&invoker);

    stub.audit(Some("month-end".to_owned())).expect("audit ignores result");
    assert_eq!(invoker.last().expect("one call").argument, json!("month-end"));
}

#[test]
fn incompatible_result_is_a_type_mismatch() {
    let invoker = RecordingInvoker::replying(json!("not a number"));
    let stub = ledger(&invoker);

    let err = stub.get_count().expect_err("string into u32");
    assert_eq!(err.code(), codes::TYPE_MISMATCH);
    assert_eq!(invoker.count(), 1);
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("connection to {peer} reset")]
struct ConnectionReset {
    peer: String,
}

#[test]
fn invoker_errors_surface_unchanged() {
    let invoker = RecordingInvoker::with(|_, _| {
        Err(InvocationError::new(ConnectionReset {
            peer: "ledger-1".to_owned(),
        }))
    });
    let stub = ledger(&invoker);

    let err = stub.balance("acc-9").expect_err("transport failure");
    assert_eq!(err.code(), codes::INVOCATION);
    assert_eq!(err.to_string(), "connection to ledger-1 reset");
    let original = err
        .as_invocation()
        .and_then(|inner| inner.downcast_ref::<ConnectionReset>())
        .expect("original error type");
    assert_eq!(original.peer, "ledger-1");
}

#[derive(Debug, thiserror::Error)]
enum AccountsError {
    #[error(transparent)]
    Stub(#[from] StubError),
}

#[spark_stub::interface]
trait Health: Send + Sync {
    fn health_check(&self) -> Result<String, AccountsError>;
}

#[spark_stub::interface]
trait Accounts: Health + Send + Sync {
    #[stub(name = "openAccount")]
    fn open(
        &self,
        owner: String,
        #[stub(name = "initialDeposit")] deposit: u64,
    ) -> Result<u64, AccountsError>;

    fn close(&self, account_id: u64) -> Result<(), AccountsError>;
}

#[test]
fn caller_error_types_convert_from_stub_errors() {
    let stub = StubCache::new()
        .create_instance::<dyn Accounts, _>(invoker_fn(|_, _| {
            Err(InvocationError::new("accounts service unavailable"))
        }))
        .expect("accounts stub");

    match stub.close(7) {
        Err(AccountsError::Stub(StubError::Invocation(err))) => {
            assert_eq!(err.to_string(), "accounts service unavailable");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn inherited_methods_use_the_declaring_interface() {
    let invoker = RecordingInvoker::with(|method, _| match method {
        "health_check" => Ok(json!("serving")),
        "openAccount" => Ok(json!(1001)),
        other => Err(InvocationError::new(format!("unexpected method {other}"))),
    });
    let cache = StubCache::new();
    let stub = cache
        .create_instance::<dyn Accounts, _>(Arc::clone(&invoker))
        .expect("accounts stub");

    assert_eq!(stub.health_check().expect("health"), "serving");
    assert_eq!(stub.open("ada".to_owned(), 500).expect("open"), 1001);
    assert_eq!(
        invoker.calls(),
        vec![
            Call {
                method: "health_check".to_owned(),
                argument: json!(null),
            },
            Call {
                method: "openAccount".to_owned(),
                argument: json!({ "owner": "ada", "initialDeposit": 500 }),
            },
        ]
    );

    let blueprint = cache
        .get_or_build::<dyn Accounts>()
        .expect("cached");
    let inherited = blueprint.descriptor().method("health_check").expect("inherited");
    assert_eq!(
        inherited.origin,
        <dyn Health as spark_stub::Interface>::TYPE_INFO.identity
    );
    let names: Vec<_> = blueprint
        .descriptor()
        .methods
        .iter()
        .map(|method| method.name.as_str())
        .collect();
    assert_eq!(names, ["openAccount", "close", "health_check"]);
}

#[test]
fn parent_interface_stub_is_usable_on_its_own() {
    let stub = StubCache::new()
        .create_instance::<dyn Health, _>(invoker_fn(|method, _| Ok(json!(method))))
        .expect("health stub");
    assert_eq!(stub.health_check().expect("health"), "health_check");
}

#[test]
fn naming_convention_applies_to_unrenamed_keys() {
    let invoker = RecordingInvoker::replying(json!(null));
    let cache =
        StubCache::with_config(StubConfig::default().with_naming(NamingConvention::LowerCamelCase));
    let stub = cache
        .create_instance::<dyn Accounts, _>(Arc::clone(&invoker))
        .expect("accounts stub");

    stub.close(3).expect("close");
    stub.health_check().expect_err("null is not a string");

    let methods: Vec<_> = invoker.calls().into_iter().map(|call| call.method).collect();
    assert_eq!(methods, ["close", "healthCheck"]);

    let blueprint = cache
        .get_or_build::<dyn Accounts>()
        .expect("cached");
    let close = blueprint.descriptor().method("close").expect("close");
    assert_eq!(close.parameters[0].name, "accountId");
    let open = blueprint.descriptor().method("openAccount").expect("renamed");
    let keys: Vec<_> = open.parameters.iter().map(|param| param.name.as_str()).collect();
    assert_eq!(keys, ["owner", "initialDeposit"]);
}

#[test]
fn stubs_are_send_and_sync_when_the_interface_is() {
    fn assert_send_sync<T: Send + Sync + ?Sized>(_: &T) {}

    let invoker: Arc<dyn Invoker> = RecordingInvoker::replying(json!(0));
    let stub = StubCache::new()
        .create_shared::<dyn Ledger>(invoker)
        .expect("ledger stub");
    assert_send_sync(&*stub);

    let handle = std::thread::spawn(move || stub.get_count().expect("getCount"));
    assert_eq!(handle.join().expect("thread"), 0);
}

#[spark_stub::interface]
trait Registry: Send + Sync + 'static {
    fn resolve(&self, name: String) -> Result<String, StubError>;
}

#[test]
fn lifetime_supertraits_are_carried_to_the_stub() {
    fn keep<T: ?Sized + 'static>(value: Box<T>) -> Box<T> {
        value
    }

    let invoker = RecordingInvoker::replying(json!("10.0.0.7"));
    let stub = StubCache::new()
        .create_instance::<dyn Registry, _>(Arc::clone(&invoker))
        .expect("registry stub");
    let stub = keep(stub);

    let handle = std::thread::spawn(move || stub.resolve("db".to_owned()).expect("resolve"));
    assert_eq!(handle.join().expect("thread"), "10.0.0.7");
    assert_eq!(
        invoker.last(),
        Some(Call {
            method: "resolve".to_owned(),
            argument: json!("db"),
        })
    );
}
