//! 转发桩实例：蓝图 + Invoker 的绑定。
//!
//! # 调用路径（How）
//! 生成的转发方法收集实参后调用 [`StubInstance::call`] / [`StubInstance::call_void`]：
//! 1. 以 `(声明接口, 方法名)` 在蓝图中查到方法描述；
//! 2. 按元数规则组装线路实参（见 [`wire`](crate::wire)）；
//! 3. 以分派键调用 Invoker，恰好一次；
//! 4. 无返回值的方法丢弃结果，其余方法把结果解包为声明类型。
//!
//! Invoker 失败时不做解包，错误原样返回。

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::descriptor::ReturnDescriptor;
use crate::error::StubError;
use crate::generator::StubBlueprint;
use crate::invoker::Invoker;
use crate::marshal::{GenericValue, unpack};
use crate::wire::{ArgumentList, encode_arguments};

/// 绑定到某个 Invoker 的转发桩。
///
/// `T` 为接口的 trait 对象类型（如 `dyn Ledger`）；`#[spark_stub::interface]` 为
/// `StubInstance<T>` 实现接口 trait，调用方通常只拿到 `Box<dyn Ledger>`。
///
/// 实例不持有可变状态，克隆后共享同一蓝图与 Invoker。
pub struct StubInstance<T: ?Sized> {
    blueprint: Arc<StubBlueprint>,
    invoker: Arc<dyn Invoker>,
    _interface: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized> StubInstance<T> {
    pub fn new(blueprint: Arc<StubBlueprint>, invoker: Arc<dyn Invoker>) -> Self {
        Self {
            blueprint,
            invoker,
            _interface: PhantomData,
        }
    }

    pub fn blueprint(&self) -> &Arc<StubBlueprint> {
        &self.blueprint
    }

    pub fn invoker(&self) -> &Arc<dyn Invoker> {
        &self.invoker
    }

    /// 生成代码使用：转发有返回值的方法。
    #[doc(hidden)]
    pub fn call<R>(
        &self,
        origin: &'static str,
        symbol: &'static str,
        arguments: ArgumentList,
    ) -> Result<R, StubError>
    where
        R: DeserializeOwned,
    {
        match self.forward(origin, symbol, arguments)? {
            Some(result) => unpack(result),
            None => unpack(GenericValue::Null),
        }
    }

    /// 生成代码使用：转发无返回值的方法。
    #[doc(hidden)]
    pub fn call_void(
        &self,
        origin: &'static str,
        symbol: &'static str,
        arguments: ArgumentList,
    ) -> Result<(), StubError> {
        self.forward(origin, symbol, arguments).map(drop)
    }

    /// 返回 `None` 表示方法无返回值，Invoker 的结果已被丢弃。
    fn forward(
        &self,
        origin: &'static str,
        symbol: &'static str,
        arguments: ArgumentList,
    ) -> Result<Option<GenericValue>, StubError> {
        let method =
            self.blueprint
                .method(origin, symbol)
                .ok_or_else(|| StubError::UnknownMethod {
                    interface: self.blueprint.identity().to_owned(),
                    origin: origin.to_owned(),
                    symbol: symbol.to_owned(),
                })?;

        let argument = encode_arguments(method, arguments.into_values()?)?;

        if self.blueprint.log_payloads() {
            tracing::debug!(
                target: "spark_stub::call",
                interface = self.blueprint.identity(),
                method = %method.name,
                argument = %argument,
                "invoking"
            );
        } else {
            tracing::trace!(
                target: "spark_stub::call",
                interface = self.blueprint.identity(),
                method = %method.name,
                arity = method.arity(),
                "invoking"
            );
        }

        let result = match self.invoker.invoke(&method.name, argument) {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(
                    target: "spark_stub::call",
                    interface = self.blueprint.identity(),
                    method = %method.name,
                    error = %err,
                    "invoker failed"
                );
                return Err(StubError::Invocation(err));
            }
        };

        match method.returns {
            ReturnDescriptor::Void => Ok(None),
            ReturnDescriptor::Value(tag) => {
                if self.blueprint.log_payloads() {
                    tracing::debug!(
                        target: "spark_stub::call",
                        method = %method.name,
                        returns = tag.as_str(),
                        result = %result,
                        "invoker returned"
                    );
                }
                Ok(Some(result))
            }
        }
    }
}

impl<T: ?Sized> Clone for StubInstance<T> {
    fn clone(&self) -> Self {
        Self {
            blueprint: Arc::clone(&self.blueprint),
            invoker: Arc::clone(&self.invoker),
            _interface: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for StubInstance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubInstance")
            .field("interface", &self.blueprint.identity())
            .finish_non_exhaustive()
    }
}
