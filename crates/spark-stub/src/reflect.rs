//! 接口反射器：把静态元数据展平为运行期描述。
//!
//! # 执行逻辑 (How)
//! 1. 校验类型种类为接口，否则返回 [`GenerationError::NotAnInterface`]；
//! 2. 先收集接口自身声明的方法（声明顺序），再按父接口列出顺序深度优先收集继承的方法；
//!    菱形继承中同一父接口只访问一次；
//! 3. 逐个参数检查名称是否保留，缺失时返回 [`GenerationError::UnnamedParameter`]；
//! 4. 套用命名约定得到分派键与参数键，显式重命名优先。
//!
//! 同一 `TypeInfo` 与命名约定下，输出顺序确定且稳定。

use std::collections::HashSet;

use crate::config::NamingConvention;
use crate::descriptor::{
    InterfaceDescriptor, MethodDescriptor, MethodInfo, ParameterDescriptor, ReturnDescriptor,
    TypeInfo, TypeKind, TypeTag,
};
use crate::error::GenerationError;

/// 描述接口，返回展平后的方法列表。
pub fn describe(
    info: &'static TypeInfo,
    naming: NamingConvention,
) -> Result<InterfaceDescriptor, GenerationError> {
    ensure_interface(info)?;

    let mut methods = Vec::new();
    let mut visited = HashSet::new();
    collect(info, naming, &mut visited, &mut methods)?;

    Ok(InterfaceDescriptor {
        identity: info.identity,
        methods,
    })
}

fn ensure_interface(info: &TypeInfo) -> Result<(), GenerationError> {
    if info.kind == TypeKind::Interface {
        Ok(())
    } else {
        Err(GenerationError::NotAnInterface {
            identity: info.identity.to_owned(),
            kind: info.kind,
        })
    }
}

fn collect(
    info: &'static TypeInfo,
    naming: NamingConvention,
    visited: &mut HashSet<&'static str>,
    methods: &mut Vec<MethodDescriptor>,
) -> Result<(), GenerationError> {
    if !visited.insert(info.identity) {
        return Ok(());
    }

    for method in info.methods {
        methods.push(describe_method(info.identity, method, naming)?);
    }

    for supertrait in info.supertraits {
        ensure_interface(supertrait)?;
        collect(supertrait, naming, visited, methods)?;
    }
    Ok(())
}

fn describe_method(
    origin: &'static str,
    method: &'static MethodInfo,
    naming: NamingConvention,
) -> Result<MethodDescriptor, GenerationError> {
    let parameters = method
        .parameters
        .iter()
        .enumerate()
        .map(|(position, param)| {
            let name = match (param.rename, param.name) {
                (Some(rename), _) => rename.to_owned(),
                (None, Some(declared)) => naming.apply(declared),
                (None, None) => {
                    return Err(GenerationError::UnnamedParameter {
                        interface: origin.to_owned(),
                        method: method.symbol.to_owned(),
                        position,
                    });
                }
            };
            Ok(ParameterDescriptor {
                name,
                ty: TypeTag::new(param.ty),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let name = match method.rename {
        Some(rename) => rename.to_owned(),
        None => naming.apply(method.symbol),
    };

    Ok(MethodDescriptor {
        name,
        origin,
        symbol: method.symbol,
        parameters,
        returns: match method.returns {
            Some(tag) => ReturnDescriptor::Value(TypeTag::new(tag)),
            None => ReturnDescriptor::Void,
        },
    })
}
