//! 接口描述模型。
//!
//! 分为两层：
//! - **静态元数据**（[`TypeInfo`]/[`MethodInfo`]/[`ParamInfo`]）：由 `#[spark_stub::interface]`
//!   在编译期生成，全部是 `'static` 数据，零运行期开销；外部描述来源也可以手写这些常量；
//! - **运行期描述**（[`InterfaceDescriptor`]/[`MethodDescriptor`]/[`ParameterDescriptor`]）：
//!   由 [`reflect::describe`](crate::reflect::describe) 展平父接口并套用命名约定后得到，
//!   其中的名称即线路上使用的键。

use std::fmt;

/// 类型的种类。只有 [`TypeKind::Interface`] 可以生成转发桩。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypeKind {
    /// trait 等接口类构造。
    Interface,
    /// 具名字段的记录类型（struct）。
    Record,
    /// 枚举类型。
    Enum,
    /// 其他无法识别的类型。
    Opaque,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeKind::Interface => "interface",
            TypeKind::Record => "record",
            TypeKind::Enum => "enum",
            TypeKind::Opaque => "opaque type",
        })
    }
}

/// 某个类型的静态反射元数据。
///
/// # 契约 (What)
/// - `identity`：稳定键，约定为完全限定路径（如 `billing::ledger::Ledger`），缓存以它为索引；
/// - `methods`：该类型**直接**声明的方法，按声明顺序排列；
/// - `supertraits`：组合进来的父接口，按声明顺序排列，继承的方法由反射器展平。
#[derive(Debug)]
pub struct TypeInfo {
    pub identity: &'static str,
    pub kind: TypeKind,
    pub methods: &'static [MethodInfo],
    pub supertraits: &'static [&'static TypeInfo],
}

/// 单个方法的静态元数据。
#[derive(Debug)]
pub struct MethodInfo {
    /// Rust 方法名（不含 `r#` 前缀）。
    pub symbol: &'static str,
    /// `#[stub(name = "...")]` 指定的显式分派键。
    pub rename: Option<&'static str>,
    pub parameters: &'static [ParamInfo],
    /// 返回值类型标签；`None` 表示无返回值。
    pub returns: Option<&'static str>,
}

/// 单个参数的静态元数据。
#[derive(Debug)]
pub struct ParamInfo {
    /// 声明中的参数名；声明未保留名称时为 `None`。
    pub name: Option<&'static str>,
    /// `#[stub(name = "...")]` 指定的显式线路键。
    pub rename: Option<&'static str>,
    pub ty: &'static str,
}

/// 类型标签：声明中的类型文本，仅用于诊断与日志。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TypeTag(&'static str);

impl TypeTag {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// 方法的返回形态。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReturnDescriptor {
    /// 无返回值：Invoker 的结果被丢弃，不做解包。
    Void,
    /// 返回声明类型的值。
    Value(TypeTag),
}

impl ReturnDescriptor {
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnDescriptor::Void)
    }
}

/// 参数描述：线路键 + 类型标签。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: TypeTag,
}

/// 方法描述。
///
/// # 教案式说明
/// - **`name`**：分派键，即传给 Invoker 的方法名，在接口内唯一；
/// - **`origin` + `symbol`**：声明该方法的接口标识与 Rust 方法名，组成 [`MethodKey`]；
///   继承来的方法 `origin` 指向父接口，生成代码据此在蓝图中找到转发计划。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodDescriptor {
    pub name: String,
    pub origin: &'static str,
    pub symbol: &'static str,
    pub parameters: Vec<ParameterDescriptor>,
    pub returns: ReturnDescriptor,
}

impl MethodDescriptor {
    pub fn key(&self) -> MethodKey {
        MethodKey {
            origin: self.origin,
            symbol: self.symbol,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// 诊断用的限定名，形如 `billing::Ledger::balance`。
    pub fn qualified_symbol(&self) -> String {
        format!("{}::{}", self.origin, self.symbol)
    }
}

/// 生成代码定位转发计划所用的键。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MethodKey {
    pub origin: &'static str,
    pub symbol: &'static str,
}

/// 接口描述：标识 + 展平后的方法列表。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfaceDescriptor {
    pub identity: &'static str,
    pub methods: Vec<MethodDescriptor>,
}

impl InterfaceDescriptor {
    /// 按分派键查找方法。
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name == name)
    }
}
