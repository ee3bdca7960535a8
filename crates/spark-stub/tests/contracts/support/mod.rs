//! 合约测试支撑模块：记录型 Invoker 与共享的测试接口。
//!
//! # 使用说明（How）
//! - [`RecordingInvoker`] 按调用顺序记录 `(分派键, 线路实参)`，并以可替换的应答函数返回结果；
//! - 通过 `Arc<RecordingInvoker>` 传给 `create_instance`，测试结束后仍可读取调用记录。

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use spark_stub::{GenericValue, InvocationError, Invoker, StubError};

/// 一次被记录的调用。
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub method: String,
    pub argument: GenericValue,
}

type Responder =
    Box<dyn Fn(&str, &GenericValue) -> Result<GenericValue, InvocationError> + Send + Sync>;

pub struct RecordingInvoker {
    calls: Mutex<Vec<Call>>,
    responder: Responder,
}

impl RecordingInvoker {
    /// 对任何调用都返回同一个值。
    pub fn replying(value: GenericValue) -> Arc<Self> {
        Self::with(move |_, _| Ok(value.clone()))
    }

    pub fn with<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str, &GenericValue) -> Result<GenericValue, InvocationError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn last(&self) -> Option<Call> {
        self.calls.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Invoker for RecordingInvoker {
    fn invoke(&self, method: &str, argument: GenericValue) -> Result<GenericValue, InvocationError> {
        let reply = (self.responder)(method, &argument);
        self.calls.lock().push(Call {
            method: method.to_owned(),
            argument,
        });
        reply
    }
}

/// 转账回执，用于验证记录类型的解包。
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Receipt {
    pub from: String,
    pub to: String,
    pub cents: u64,
}

#[spark_stub::interface]
pub trait Ledger: Send + Sync {
    #[stub(name = "getCount")]
    fn get_count(&self) -> Result<u32, StubError>;

    fn balance(&self, account: &str) -> Result<i64, StubError>;

    fn transfer(&self, from: &str, to: &str, cents: u64) -> Result<Receipt, StubError>;

    fn audit(&self, note: Option<String>) -> Result<(), StubError>;
}
