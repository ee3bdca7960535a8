//! 转发桩生成器：由接口描述构建可复用的蓝图。
//!
//! # 设计意图（Why）
//! - 编译期宏只生成“把实参交给运行时”的薄转发层；分派键、元数规则与是否解包结果
//!   都由这里构建的 [`StubBlueprint`] 决定，线路形态因此只有一个事实来源；
//! - 蓝图构建完成后不可变，可在任意线程间共享并派生任意多个绑定实例。
//!
//! # 失败语义（What）
//! - 两个方法映射到同一分派键（例如两个父接口各自声明了同名方法，或命名约定转换后撞名）
//!   → [`GenerationError::AmbiguousMethod`]；
//! - 同一方法的两个参数映射到同一线路键 → [`GenerationError::AmbiguousParameter`]。

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use crate::config::StubConfig;
use crate::descriptor::{InterfaceDescriptor, MethodDescriptor, MethodKey};
use crate::error::GenerationError;
use crate::instance::StubInstance;
use crate::invoker::Invoker;

/// 构建蓝图。无 I/O，无副作用。
pub fn build(
    descriptor: InterfaceDescriptor,
    config: &StubConfig,
) -> Result<StubBlueprint, GenerationError> {
    let mut by_key: HashMap<&str, &MethodDescriptor> =
        HashMap::with_capacity(descriptor.methods.len());
    for method in &descriptor.methods {
        match by_key.entry(method.name.as_str()) {
            Entry::Occupied(existing) => {
                return Err(GenerationError::AmbiguousMethod {
                    interface: descriptor.identity.to_owned(),
                    key: method.name.clone(),
                    first: existing.get().qualified_symbol(),
                    second: method.qualified_symbol(),
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(method);
            }
        }
        ensure_unique_parameters(descriptor.identity, method)?;
    }

    let index = descriptor
        .methods
        .iter()
        .enumerate()
        .map(|(slot, method)| (method.key(), slot))
        .collect();

    Ok(StubBlueprint {
        descriptor,
        index,
        log_payloads: config.log_payloads,
    })
}

fn ensure_unique_parameters(
    interface: &str,
    method: &MethodDescriptor,
) -> Result<(), GenerationError> {
    for (position, parameter) in method.parameters.iter().enumerate() {
        if method.parameters[..position]
            .iter()
            .any(|earlier| earlier.name == parameter.name)
        {
            return Err(GenerationError::AmbiguousParameter {
                interface: interface.to_owned(),
                method: method.name.clone(),
                key: parameter.name.clone(),
            });
        }
    }
    Ok(())
}

/// 某个接口的转发蓝图。
///
/// # 教案式说明
/// - **契约 (What)**：持有展平后的接口描述与 `MethodKey → 方法` 索引；构建后不可变；
/// - **执行逻辑 (How)**：生成代码以 `(声明接口, 方法名)` 调用 [`StubInstance`]，实例在蓝图中查到
///   对应的 [`MethodDescriptor`]，据此打包实参、选择分派键并决定是否解包结果。
pub struct StubBlueprint {
    descriptor: InterfaceDescriptor,
    index: HashMap<MethodKey, usize>,
    log_payloads: bool,
}

impl StubBlueprint {
    pub fn identity(&self) -> &'static str {
        self.descriptor.identity
    }

    pub fn descriptor(&self) -> &InterfaceDescriptor {
        &self.descriptor
    }

    /// 按声明接口与 Rust 方法名查找转发计划。
    pub fn method(&self, origin: &'static str, symbol: &'static str) -> Option<&MethodDescriptor> {
        self.method_by_key(&MethodKey { origin, symbol })
    }

    pub fn method_by_key(&self, key: &MethodKey) -> Option<&MethodDescriptor> {
        self.index
            .get(key)
            .map(|slot| &self.descriptor.methods[*slot])
    }

    pub fn len(&self) -> usize {
        self.descriptor.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptor.methods.is_empty()
    }

    pub fn log_payloads(&self) -> bool {
        self.log_payloads
    }

    /// 派生一个绑定到 `invoker` 的实例。
    pub fn instantiate<T>(self: &Arc<Self>, invoker: Arc<dyn Invoker>) -> StubInstance<T>
    where
        T: ?Sized,
    {
        StubInstance::new(Arc::clone(self), invoker)
    }
}

impl fmt::Debug for StubBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubBlueprint")
            .field("identity", &self.descriptor.identity)
            .field(
                "methods",
                &self
                    .descriptor
                    .methods
                    .iter()
                    .map(|method| method.name.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("log_payloads", &self.log_payloads)
            .finish()
    }
}
