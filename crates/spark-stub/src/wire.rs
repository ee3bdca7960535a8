//! 线路形态：按元数打包实参，以及分派端对应的解包。
//!
//! | 参数个数 | 打包形态 |
//! |---|---|
//! | 0 | 缺省实参，即 `null` |
//! | 1 | 该参数打包后的值本身，不做包装 |
//! | ≥2 | 键值映射：参数名 → 打包后的值 |
//!
//! 单参数不做包装。任何解码实参的分派端都必须
//! 以完全相同的规则还原，[`decode_arguments`] 即该规则的参考实现。此表一经发布不再变更。

use serde::Serialize;
use serde_json::Map;

use crate::descriptor::MethodDescriptor;
use crate::error::{MarshalDirection, StubError};
use crate::marshal::{GenericValue, pack};

/// 实参在线路上的形态。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgumentShape {
    /// 无实参，线路上为 `null`。
    Absent,
    /// 单个实参，线路上为其打包值本身。
    Bare,
    /// 多个实参，线路上为参数名到打包值的映射。
    Keyed,
}

impl ArgumentShape {
    pub fn for_arity(arity: usize) -> Self {
        match arity {
            0 => ArgumentShape::Absent,
            1 => ArgumentShape::Bare,
            _ => ArgumentShape::Keyed,
        }
    }
}

/// 按方法声明把已打包的实参组装为线路实参。
///
/// `values` 必须与 `method.parameters` 一一对应且顺序一致。
pub fn encode_arguments(
    method: &MethodDescriptor,
    mut values: Vec<GenericValue>,
) -> Result<GenericValue, StubError> {
    if values.len() != method.arity() {
        return Err(StubError::ArityMismatch {
            method: method.name.clone(),
            expected: method.arity(),
            actual: values.len(),
        });
    }

    Ok(match ArgumentShape::for_arity(values.len()) {
        ArgumentShape::Absent => GenericValue::Null,
        ArgumentShape::Bare => values.pop().unwrap_or_default(),
        ArgumentShape::Keyed => {
            let mut mapping = Map::with_capacity(values.len());
            for (parameter, value) in method.parameters.iter().zip(values) {
                mapping.insert(parameter.name.clone(), value);
            }
            GenericValue::Object(mapping)
        }
    })
}

/// 分派端：把线路实参还原为按参数顺序排列的值。
///
/// # 契约 (What)
/// - 无参方法要求实参为 `null`；
/// - 单参方法原样返回实参；
/// - 多参方法要求实参为映射，并按参数名逐个取出；缺失时返回
///   [`StubError::MissingArgument`]，多余的键被忽略。
pub fn decode_arguments(
    method: &MethodDescriptor,
    argument: GenericValue,
) -> Result<Vec<GenericValue>, StubError> {
    match ArgumentShape::for_arity(method.arity()) {
        ArgumentShape::Absent => {
            if argument.is_null() {
                Ok(Vec::new())
            } else {
                Err(StubError::TypeMismatch {
                    direction: MarshalDirection::Unpack,
                    target: "absent argument",
                    detail: format!(
                        "`{}` takes no arguments but received {}",
                        method.name,
                        shape_name(&argument)
                    ),
                })
            }
        }
        ArgumentShape::Bare => Ok(vec![argument]),
        ArgumentShape::Keyed => {
            let mut mapping = match argument {
                GenericValue::Object(mapping) => mapping,
                other => {
                    return Err(StubError::TypeMismatch {
                        direction: MarshalDirection::Unpack,
                        target: "keyed argument mapping",
                        detail: format!(
                            "`{}` takes {} arguments but received {}",
                            method.name,
                            method.arity(),
                            shape_name(&other)
                        ),
                    });
                }
            };
            method
                .parameters
                .iter()
                .map(|parameter| {
                    mapping
                        .remove(&parameter.name)
                        .ok_or_else(|| StubError::MissingArgument {
                            method: method.name.clone(),
                            name: parameter.name.clone(),
                        })
                })
                .collect()
        }
    }
}

fn shape_name(value: &GenericValue) -> &'static str {
    match value {
        GenericValue::Null => "null",
        GenericValue::Bool(_) => "a boolean",
        GenericValue::Number(_) => "a number",
        GenericValue::String(_) => "a string",
        GenericValue::Array(_) => "a list",
        GenericValue::Object(_) => "a mapping",
    }
}

/// 生成代码使用的实参收集器。
///
/// 逐个打包实参；一旦某个实参打包失败，后续 `push` 不再执行，
/// 错误在 [`ArgumentList::into_values`] 时返回。
#[derive(Debug, Default)]
pub struct ArgumentList {
    values: Vec<GenericValue>,
    error: Option<StubError>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            error: None,
        }
    }

    #[must_use]
    pub fn push<T>(mut self, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        if self.error.is_none() {
            match pack(value) {
                Ok(packed) => self.values.push(packed),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// 已成功打包的实参个数。
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Result<Vec<GenericValue>, StubError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.values),
        }
    }
}
