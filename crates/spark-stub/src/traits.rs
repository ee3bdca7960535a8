//! 接口标记 trait，由 `#[spark_stub::interface]` 为 `dyn Trait` 实现。

use crate::descriptor::TypeInfo;
use crate::instance::StubInstance;

/// 可以生成转发桩的接口。
///
/// # 契约 (What)
/// - `Self` 是接口的 trait 对象类型，例如 `dyn Ledger`；
/// - [`Interface::TYPE_INFO`] 描述接口直接声明的方法与父接口，
///   `identity` 在进程内唯一，缓存以它为索引；
/// - [`Interface::bind`] 把实例装箱为接口对象，生成代码中即 `Box::new(instance)`。
///
/// 手写实现可以接入外部描述来源，但 `TYPE_INFO.kind` 不是
/// [`TypeKind::Interface`](crate::TypeKind::Interface) 时，生成会以 `NotAnInterface` 失败。
pub trait Interface: 'static {
    const TYPE_INFO: &'static TypeInfo;

    fn bind(instance: StubInstance<Self>) -> Box<Self>;
}

/// `Self` 的转发桩可以代表接口 `S` 转发调用。
///
/// 宏为每个接口生成 `dyn X: Extends<dyn X>`，并为每个父接口 `P` 生成
/// `dyn X: Extends<dyn P>`，`StubInstance<dyn X>` 由此同时实现子接口与父接口。
#[doc(hidden)]
pub trait Extends<S: ?Sized> {}
