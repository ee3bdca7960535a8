//! Invoker：转发桩与传输层之间唯一的边界契约。
//!
//! # 契约 (What)
//! - `invoke(method, argument)` 每次调用要么返回恰好一个结果，要么失败恰好一次；
//! - 同步性、传输、超时、取消与重试全部属于 Invoker 实现自身，核心不做任何假设；
//! - 失败以 [`InvocationError`] 表达，核心原样透传给转发桩方法的调用方。

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::marshal::GenericValue;

/// 单操作的调用能力。
///
/// 实现必须是 `Send + Sync`：同一个 Invoker 会被多个转发桩实例在多个线程上并发调用。
pub trait Invoker: Send + Sync {
    /// 以分派键 `method` 与打包后的实参调用远端。
    fn invoke(&self, method: &str, argument: GenericValue) -> Result<GenericValue, InvocationError>;
}

impl<I> Invoker for Arc<I>
where
    I: Invoker + ?Sized,
{
    fn invoke(&self, method: &str, argument: GenericValue) -> Result<GenericValue, InvocationError> {
        (**self).invoke(method, argument)
    }
}

impl<I> Invoker for Box<I>
where
    I: Invoker + ?Sized,
{
    fn invoke(&self, method: &str, argument: GenericValue) -> Result<GenericValue, InvocationError> {
        (**self).invoke(method, argument)
    }
}

/// 将闭包适配为 [`Invoker`]。
///
/// 通过 [`invoker_fn`] 构造。
#[derive(Clone)]
pub struct FnInvoker<F> {
    f: F,
}

impl<F> FnInvoker<F>
where
    F: Fn(&str, GenericValue) -> Result<GenericValue, InvocationError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }

    pub fn into_inner(self) -> F {
        self.f
    }
}

impl<F> Invoker for FnInvoker<F>
where
    F: Fn(&str, GenericValue) -> Result<GenericValue, InvocationError> + Send + Sync,
{
    fn invoke(&self, method: &str, argument: GenericValue) -> Result<GenericValue, InvocationError> {
        (self.f)(method, argument)
    }
}

impl<F> fmt::Debug for FnInvoker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInvoker").finish_non_exhaustive()
    }
}

/// 以闭包构造 Invoker 的便捷函数。
pub fn invoker_fn<F>(f: F) -> FnInvoker<F>
where
    F: Fn(&str, GenericValue) -> Result<GenericValue, InvocationError> + Send + Sync,
{
    FnInvoker::new(f)
}

/// Invoker 报告的失败。
///
/// # 教案式说明
/// - **意图 (Why)**：核心无法从传输层失败中恢复，只负责把错误原样交还调用方；
/// - **契约 (What)**：`Display` 与 `source` 均委托给内部错误，调用方可通过
///   [`InvocationError::downcast_ref`] 取回 Invoker 实现构造的原始类型；
/// - **风险 (Trade-offs)**：内部错误以 `Box<dyn Error>` 保存，不可克隆，因此调用期错误不会被缓存。
pub struct InvocationError {
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl InvocationError {
    /// 包装任意错误或错误消息。
    pub fn new(error: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            inner: error.into(),
        }
    }

    /// 内部错误是否为类型 `E`。
    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.inner.is::<E>()
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// 尝试取回原始类型；类型不符时返回原错误。
    pub fn downcast<E>(self) -> Result<Box<E>, Self>
    where
        E: StdError + 'static,
    {
        self.inner.downcast::<E>().map_err(|inner| Self { inner })
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.inner
    }
}

impl fmt::Debug for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for InvocationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}
