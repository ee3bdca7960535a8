//! 转发桩配置。
//!
//! # 契约 (What)
//! - [`StubConfig`] 在创建 [`StubCache`](crate::StubCache) 时确定，之后不可变；
//!   同一缓存生成的所有蓝图共享同一份配置；
//! - 可从 TOML 加载，键名使用 kebab-case，未知字段直接报错：
//!
//! ```toml
//! naming = "lower-camel-case"
//! log-payloads = true
//! ```

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

use crate::error::StubError;

/// 分派键与参数键的命名约定。
///
/// 仅作用于未通过 `#[stub(name = "...")]` 显式命名的方法与参数。
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingConvention {
    /// 保持 Rust 声明中的写法。
    #[default]
    AsDeclared,
    /// `get_count` → `getCount`。
    LowerCamelCase,
    /// `get_count` → `GetCount`。
    UpperCamelCase,
    /// `getCount` → `get_count`。
    SnakeCase,
}

impl NamingConvention {
    /// 将声明中的标识符转换为线路键。
    pub fn apply(&self, ident: &str) -> String {
        match self {
            NamingConvention::AsDeclared => ident.to_owned(),
            NamingConvention::LowerCamelCase => ident.to_lower_camel_case(),
            NamingConvention::UpperCamelCase => ident.to_upper_camel_case(),
            NamingConvention::SnakeCase => ident.to_snake_case(),
        }
    }
}

/// 转发桩缓存的配置。
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct StubConfig {
    /// 分派键与参数键的命名约定。
    pub naming: NamingConvention,
    /// 是否在调用事件中附带打包后的实参与原始结果。
    ///
    /// 载荷可能包含业务敏感数据，默认关闭。
    pub log_payloads: bool,
}

impl StubConfig {
    /// 从 TOML 文本解析配置。
    pub fn from_toml_str(source: &str) -> Result<Self, StubError> {
        toml::from_str(source).map_err(|err| StubError::Config(err.to_string()))
    }

    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_log_payloads(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }
}
