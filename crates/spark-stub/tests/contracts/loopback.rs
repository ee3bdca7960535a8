//! 回环合约：分派端用同一份蓝图与 `wire::decode_arguments` 还原实参，再调用真实实现。
//!
//! 该用例证明线路形态对双方对称：转发桩打包的实参可以被分派端按参数名无损取回。

mod support;

use std::sync::{Arc, OnceLock};

use spark_stub::wire::decode_arguments;
use spark_stub::{
    GenericValue, InvocationError, Invoker, StubBlueprint, StubCache, StubError, pack, unpack,
};
use support::{Ledger, Receipt};

/// 服务端的真实实现。
struct InMemoryLedger;

impl Ledger for InMemoryLedger {
    fn get_count(&self) -> Result<u32, StubError> {
        Ok(3)
    }

    fn balance(&self, account: &str) -> Result<i64, StubError> {
        Ok(if account == "overdrawn" { -20 } else { 100 })
    }

    fn transfer(&self, from: &str, to: &str, cents: u64) -> Result<Receipt, StubError> {
        Ok(Receipt {
            from: from.to_owned(),
            to: to.to_owned(),
            cents,
        })
    }

    fn audit(&self, _note: Option<String>) -> Result<(), StubError> {
        Ok(())
    }
}

/// 以蓝图中的方法描述解码实参并分派到 `InMemoryLedger`。
struct Dispatcher {
    blueprint: OnceLock<Arc<StubBlueprint>>,
    cache: Arc<StubCache>,
    target: InMemoryLedger,
}

impl Dispatcher {
    fn dispatch(&self, method: &str, argument: GenericValue) -> Result<GenericValue, StubError> {
        let blueprint = match self.blueprint.get() {
            Some(blueprint) => blueprint,
            None => {
                let built = self.cache.get_or_build::<dyn Ledger>()?;
                self.blueprint.get_or_init(|| built)
            }
        };
        let descriptor = blueprint
            .descriptor()
            .method(method)
            .ok_or_else(|| StubError::Config(format!("unknown method {method}")))?;
        let mut values = decode_arguments(descriptor, argument)?.into_iter();
        let mut next = || values.next().unwrap_or_default();

        match descriptor.symbol {
            "get_count" => pack(&self.target.get_count()?),
            "balance" => {
                let account: String = unpack(next())?;
                pack(&self.target.balance(&account)?)
            }
            "transfer" => {
                let from: String = unpack(next())?;
                let to: String = unpack(next())?;
                let cents: u64 = unpack(next())?;
                pack(&self.target.transfer(&from, &to, cents)?)
            }
            "audit" => {
                let note: Option<String> = unpack(next())?;
                self.target.audit(note)?;
                Ok(GenericValue::Null)
            }
            other => Err(StubError::Config(format!("no handler for {other}"))),
        }
    }
}

impl Invoker for Dispatcher {
    fn invoke(&self, method: &str, argument: GenericValue) -> Result<GenericValue, InvocationError> {
        self.dispatch(method, argument).map_err(InvocationError::new)
    }
}

#[test]
fn stub_and_dispatcher_agree_on_the_wire_shape() {
    let cache = Arc::new(StubCache::new());
    let dispatcher = Dispatcher {
        blueprint: OnceLock::new(),
        cache: Arc::clone(&cache),
        target: InMemoryLedger,
    };
    let stub = cache
        .create_instance::<dyn Ledger, _>(dispatcher)
        .expect("ledger stub");

    assert_eq!(stub.get_count().expect("getCount"), 3);
    assert_eq!(stub.balance("overdrawn").expect("balance"), -20);
    assert_eq!(
        stub.transfer("alice", "bob", 75).expect("transfer"),
        Receipt {
            from: "alice".to_owned(),
            to: "bob".to_owned(),
            cents: 75,
        }
    );
    stub.audit(Some("eod".to_owned())).expect("audit");
    assert_eq!(cache.generations(), 1);
}
