//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义转发桩生成与调用路径上的全部失败语义；
//! - 生成期错误（[`GenerationError`]）与调用期错误分开建模：前者需要被缓存并在后续请求中
//!   原样重放，因此必须 `Clone`；后者携带 Invoker 的原始错误，不可克隆。
//!
//! ## 错误码（What）
//! - 每个变体都有稳定的字符串错误码（见 [`codes`]），格式为 `stub.<类别>.<原因>`，
//!   供日志与告警聚合使用；错误码一经发布不再修改。

use std::fmt;

use thiserror::Error;

use crate::descriptor::TypeKind;
use crate::invoker::InvocationError;

/// 稳定错误码常量。
pub mod codes {
    /// 请求的类型不是接口。
    pub const NOT_AN_INTERFACE: &str = "stub.generation.not_interface";
    /// 两个方法在同一分派键下冲突。
    pub const AMBIGUOUS_METHOD: &str = "stub.generation.ambiguous_method";
    /// 同一方法的两个参数在同一线路键下冲突。
    pub const AMBIGUOUS_PARAMETER: &str = "stub.generation.ambiguous_parameter";
    /// 参数声明未保留名称。
    pub const UNNAMED_PARAMETER: &str = "stub.generation.unnamed_parameter";
    /// 通用值与声明类型之间无法转换。
    pub const TYPE_MISMATCH: &str = "stub.marshal.type_mismatch";
    /// 实参数量与方法声明不一致。
    pub const ARITY_MISMATCH: &str = "stub.wire.arity_mismatch";
    /// 键值映射中缺少参数。
    pub const MISSING_ARGUMENT: &str = "stub.wire.missing_argument";
    /// 蓝图中找不到被调用的方法。
    pub const UNKNOWN_METHOD: &str = "stub.call.unknown_method";
    /// Invoker 返回的错误。
    pub const INVOCATION: &str = "stub.call.invocation";
    /// 配置解析或校验失败。
    pub const CONFIG: &str = "stub.config.invalid";
    /// 全局缓存已经初始化。
    pub const ALREADY_INSTALLED: &str = "stub.cache.already_installed";
}

/// 生成蓝图阶段的失败。
///
/// # 教案式说明
/// - **意图 (Why)**：生成失败意味着接口本身需要修改，重试没有意义；
///   缓存会保存该错误，后续对同一接口的请求直接返回它而不再重新生成。
/// - **契约 (What)**：全部字段为拥有所有权的字符串，`Clone + Eq`，可安全跨线程共享。
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GenerationError {
    /// 被描述的类型不是接口（trait）。
    #[error("`{identity}` is a {kind}, not an interface; stubs can only be generated for interfaces")]
    NotAnInterface { identity: String, kind: TypeKind },

    /// 两个方法映射到同一个分派键，Invoker 无法区分它们。
    #[error(
        "dispatch key `{key}` of `{interface}` is claimed by both `{first}` and `{second}`"
    )]
    AmbiguousMethod {
        interface: String,
        key: String,
        first: String,
        second: String,
    },

    /// 同一方法的两个参数映射到同一个线路键，键值映射会互相覆盖。
    #[error("parameter key `{key}` appears twice in `{interface}::{method}`")]
    AmbiguousParameter {
        interface: String,
        method: String,
        key: String,
    },

    /// 参数声明没有保留名称（例如写成 `_`）。
    #[error(
        "parameter #{position} of `{interface}::{method}` has no declared name; \
         keyed argument mappings require every parameter to be named"
    )]
    UnnamedParameter {
        interface: String,
        method: String,
        position: usize,
    },
}

impl GenerationError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::NotAnInterface { .. } => codes::NOT_AN_INTERFACE,
            GenerationError::AmbiguousMethod { .. } => codes::AMBIGUOUS_METHOD,
            GenerationError::AmbiguousParameter { .. } => codes::AMBIGUOUS_PARAMETER,
            GenerationError::UnnamedParameter { .. } => codes::UNNAMED_PARAMETER,
        }
    }
}

/// spark-stub 对外暴露的统一错误类型。
///
/// # 教案式说明
/// - **意图 (Why)**：转发桩方法通过 `E: From<StubError>` 将失败交给调用方，调用方只需处理一个类型；
/// - **契约 (What)**：
///   - [`StubError::Invocation`] 为透明变体，`Display` 与 `source` 均来自 Invoker 原始错误；
///   - 其余变体由本 crate 产生，均带有稳定错误码（[`StubError::code`]）；
/// - **风险 (Trade-offs)**：核心不做任何重试，所有失败同步返回给调用方。
#[derive(Debug, Error)]
pub enum StubError {
    /// 生成蓝图失败（可能来自缓存的历史失败）。
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// 通用值与声明类型之间无法转换。
    #[error("cannot convert {direction} `{target}`: {detail}")]
    TypeMismatch {
        direction: MarshalDirection,
        target: &'static str,
        detail: String,
    },

    /// 实参数量与方法声明的参数数量不一致。
    #[error("`{method}` declares {expected} parameter(s) but {actual} argument(s) were supplied")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// 多参数调用的键值映射中缺少某个参数。
    #[error("argument `{name}` of `{method}` is missing from the keyed argument mapping")]
    MissingArgument { method: String, name: String },

    /// 生成代码请求的方法不在蓝图中。
    #[error("method `{symbol}` declared by `{origin}` is not part of the blueprint for `{interface}`")]
    UnknownMethod {
        interface: String,
        origin: String,
        symbol: String,
    },

    /// Invoker 返回的错误，原样透传。
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// 配置解析或校验失败。
    #[error("invalid stub configuration: {0}")]
    Config(String),

    /// 全局缓存已被初始化，无法再次安装。
    #[error("the global stub cache has already been installed")]
    AlreadyInstalled,
}

impl StubError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            StubError::Generation(err) => err.code(),
            StubError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            StubError::ArityMismatch { .. } => codes::ARITY_MISMATCH,
            StubError::MissingArgument { .. } => codes::MISSING_ARGUMENT,
            StubError::UnknownMethod { .. } => codes::UNKNOWN_METHOD,
            StubError::Invocation(_) => codes::INVOCATION,
            StubError::Config(_) => codes::CONFIG,
            StubError::AlreadyInstalled => codes::ALREADY_INSTALLED,
        }
    }

    /// 若错误来自 Invoker，返回原始错误。
    pub fn as_invocation(&self) -> Option<&InvocationError> {
        match self {
            StubError::Invocation(err) => Some(err),
            _ => None,
        }
    }

    /// 若错误来自生成阶段，返回生成错误。
    pub fn as_generation(&self) -> Option<&GenerationError> {
        match self {
            StubError::Generation(err) => Some(err),
            _ => None,
        }
    }
}

/// 编组方向，用于 [`StubError::TypeMismatch`] 的文案。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MarshalDirection {
    /// 类型化值 → 通用值。
    Pack,
    /// 通用值 → 类型化值。
    Unpack,
}

impl fmt::Display for MarshalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalDirection::Pack => f.write_str("from"),
            MarshalDirection::Unpack => f.write_str("into"),
        }
    }
}
