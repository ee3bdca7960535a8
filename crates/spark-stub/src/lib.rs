#![deny(unsafe_code)]
#![allow(clippy::result_large_err)]

//! # spark-stub
//!
//! ## 定位与职责（Why）
//! - 为接口 trait 生成转发桩：调用方拿到一个实现了该 trait 的对象，每次方法调用都被转换为
//!   对单一通用契约 `invoke(method, argument) -> result` 的一次调用；
//! - 传输、协议、超时与重试全部交给 [`Invoker`] 实现，本 crate 只负责反射接口、按固定规则
//!   打包实参、解包结果，并缓存每个接口的蓝图。
//!
//! ## 架构（Where）
//! - `#[interface]` 宏在编译期输出静态元数据 [`TypeInfo`] 与基于 [`StubInstance`] 的转发实现；
//! - [`reflect`] 将元数据展平为 [`InterfaceDescriptor`]，[`generator`] 构建 [`StubBlueprint`]；
//! - [`StubCache`] 以接口类型（`TypeId`）缓存蓝图，[`create_instance`] 使用进程级缓存；
//! - [`wire`] 固定了实参的线路形态，分派端可用 [`wire::decode_arguments`] 还原实参。
//!
//! ## 使用示例
//! ```rust
//! use spark_stub::{StubCache, StubError, invoker_fn};
//!
//! #[spark_stub::interface]
//! trait Counter {
//!     #[stub(name = "getCount")]
//!     fn get_count(&self) -> Result<u32, StubError>;
//! }
//!
//! let cache = StubCache::new();
//! let counter = cache.create_instance::<dyn Counter, _>(invoker_fn(|method, _argument| {
//!     assert_eq!(method, "getCount");
//!     Ok(serde_json::json!(42))
//! }))?;
//! assert_eq!(counter.get_count()?, 42);
//! # Ok::<(), StubError>(())
//! ```

mod cache;
mod config;
mod descriptor;
mod error;
pub mod generator;
mod instance;
mod invoker;
mod marshal;
pub mod reflect;
mod traits;
pub mod wire;

pub use spark_stub_macros::interface;

pub use cache::{StubCache, create_instance};
pub use config::{NamingConvention, StubConfig};
pub use descriptor::{
    InterfaceDescriptor, MethodDescriptor, MethodInfo, MethodKey, ParamInfo, ParameterDescriptor,
    ReturnDescriptor, TypeInfo, TypeKind, TypeTag,
};
pub use error::{GenerationError, MarshalDirection, StubError, codes};
pub use generator::StubBlueprint;
pub use instance::StubInstance;
pub use invoker::{FnInvoker, InvocationError, Invoker, invoker_fn};
pub use marshal::{GenericValue, pack, unpack};
pub use traits::{Extends, Interface};
pub use wire::ArgumentList;
