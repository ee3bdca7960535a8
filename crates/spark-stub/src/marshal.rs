//! 编组器：类型化值与通用值之间的双向转换。
//!
//! 通用值直接使用 `serde_json::Value`：它覆盖 null、布尔、数字、字符串、有序列表与键值映射，
//! 正是线路交换格式所需的全部形态。转换能力完全委托给 `serde`，本模块只负责把失败
//! 归一为 [`StubError::TypeMismatch`]。

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{MarshalDirection, StubError};

/// 参数与结果的交换格式。
pub type GenericValue = serde_json::Value;

/// 将类型化值打包为通用值。
///
/// 失败场景主要是 `serde_json` 无法表达的值，例如键不是字符串的映射。
pub fn pack<T>(value: &T) -> Result<GenericValue, StubError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value).map_err(|err| StubError::TypeMismatch {
        direction: MarshalDirection::Pack,
        target: std::any::type_name::<T>(),
        detail: err.to_string(),
    })
}

/// 将通用值解包为声明类型 `T`。
pub fn unpack<T>(value: GenericValue) -> Result<T, StubError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|err| StubError::TypeMismatch {
        direction: MarshalDirection::Unpack,
        target: std::any::type_name::<T>(),
        detail: err.to_string(),
    })
}
