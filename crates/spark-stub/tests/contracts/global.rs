//! 进程级缓存的安装合约。
//!
//! 全局缓存在进程内只能初始化一次，因此本文件只包含一个用例，独立成一个测试二进制。

use serde_json::json;
use spark_stub::{
    NamingConvention, StubCache, StubConfig, StubError, codes, create_instance, invoker_fn,
};

#[spark_stub::interface]
trait Greeter {
    fn say_hello(&self, name: String) -> Result<String, StubError>;
}

#[test]
fn global_cache_is_installed_once_and_shared() {
    let installed = StubCache::install_global(
        StubConfig::default().with_naming(NamingConvention::LowerCamelCase),
    )
    .expect("first install");
    assert!(std::ptr::eq(installed, StubCache::global()));

    let err = StubCache::install_global(StubConfig::default()).expect_err("second install");
    assert_eq!(err.code(), codes::ALREADY_INSTALLED);

    for _ in 0..3 {
        let greeter = create_instance::<dyn Greeter, _>(invoker_fn(|method, argument| {
            Ok(json!(format!("{method}:{}", argument.as_str().unwrap_or_default())))
        }))
        .expect("greeter stub");
        assert_eq!(greeter.say_hello("ada".to_owned()).expect("hello"), "sayHello:ada");
    }

    let global = StubCache::global();
    assert_eq!(global.generations(), 1);
    assert_eq!(global.config().naming, NamingConvention::LowerCamelCase);
    assert!(
        global
            .get_or_build::<dyn Greeter>()
            .is_ok()
    );
}
