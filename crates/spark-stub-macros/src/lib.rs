//! spark-stub 过程宏入口。
//!
//! # 设计意图（Why）
//! - 将“为接口 trait 生成转发桩”的工作放在编译期完成，运行期只需要按蓝图分派；
//! - 生成代码只负责把实参交给 `spark_stub::StubInstance`，分派键、元数规则、无返回值处理
//!   全部由运行期蓝图决定，保证线路形态只有一个事实来源。
//!
//! # 展开产物（What）
//! 对 `#[spark_stub::interface] trait Ledger { .. }`，宏会输出：
//! 1. 去掉 `#[stub(..)]` 辅助属性后的原始 trait；
//! 2. `impl spark_stub::Interface for dyn Ledger`：静态反射元数据 `TYPE_INFO` 与 `bind`；
//! 3. `impl spark_stub::Extends<dyn X> for dyn Ledger`：自身与每个接口父 trait 各一条；
//! 4. `impl<T: ?Sized + Extends<dyn Ledger>> Ledger for StubInstance<T>`：逐方法的转发实现。
//!
//! # 使用约束
//! - 生成代码以绝对路径 `::spark_stub` 引用运行时，调用方必须以该名称依赖运行时 crate；
//! - 父 trait 中除 `Send`/`Sync`/`Unpin` 与生命周期外，都必须同样标注 `#[interface]`，
//!   且祖先接口需要显式列出（`trait C: B + A`），否则 `StubInstance` 无法满足父 trait 约束。

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{ToTokens, format_ident, quote};
use syn::{
    Attribute, Error, FnArg, GenericArgument, GenericParam, Ident, Item, ItemTrait, LitStr, Pat,
    Path, PathArguments, ReturnType, Signature, TraitBoundModifier, TraitItem, TraitItemFn, Type,
    TypeParamBound, ext::IdentExt, parse_macro_input, parse_quote, spanned::Spanned,
};

/// 为 trait 生成反射元数据与基于 `StubInstance` 的转发实现。
///
/// # 语义说明（What）
/// - **输入**：仅接受 `trait`；结构体、枚举等具体类型会得到编译期错误；
/// - **方法要求**：接收者为 `&self`，非 `async`，不带类型/常量泛型，返回 `Result<T, E>`
///   （或单参数的 `Result<T>` 别名），其中 `E: From<spark_stub::StubError>`；`T = ()` 表示无返回值；
/// - **辅助属性**：方法或参数上的 `#[stub(name = "wireName")]` 指定线路上的键名。
///
/// # 风险提示（Trade-offs）
/// - 参数名写成 `_` 时仍能通过编译，但运行期生成蓝图会返回 `UnnamedParameter`：
///   多参数调用依赖参数名组装键值映射，宏不会替调用方编造名称。
#[proc_macro_attribute]
pub fn interface(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return Error::new(Span::call_site(), "#[spark_stub::interface] 不接受参数")
            .to_compile_error()
            .into();
    }

    let item = parse_macro_input!(item as Item);
    match item {
        Item::Trait(item_trait) => expand_interface(item_trait)
            .unwrap_or_else(|err| err.to_compile_error())
            .into(),
        _ => Error::new(
            Span::call_site(),
            "#[spark_stub::interface] 只能标注在 trait 上，具体类型无法生成转发桩",
        )
        .to_compile_error()
        .into(),
    }
}

/// 单个方法的展开计划。
struct MethodPlan {
    /// 去掉 `r#` 前缀后的方法名，与 `MethodInfo::symbol` 一致。
    symbol: String,
    rename: Option<String>,
    params: Vec<ParamPlan>,
    /// `Result<T, _>` 中的 `T`。
    output: Type,
    is_void: bool,
    /// 参数模式已替换为绑定标识符的签名，用于转发实现。
    impl_sig: Signature,
}

struct ParamPlan {
    binding: Ident,
    /// 声明中的参数名；`_` 或解构模式时为 `None`。
    name: Option<String>,
    rename: Option<String>,
    ty: Type,
}

enum Supertrait {
    /// 另一个 `#[interface]` trait。
    Interface(Path),
    /// `Send`/`Sync`/`Unpin` 与生命周期等仅作为约束传递的父约束。
    Plain(TypeParamBound),
}

fn expand_interface(mut item: ItemTrait) -> Result<TokenStream2, Error> {
    let generic_span = match (item.generics.params.first(), &item.generics.where_clause) {
        (Some(GenericParam::Type(param)), _) => Some(param.ident.span()),
        (Some(param), _) => Some(param.span()),
        (None, Some(where_clause)) => Some(where_clause.where_token.span),
        (None, None) => None,
    };
    if let Some(span) = generic_span {
        return Err(Error::new(
            span,
            "#[spark_stub::interface] 暂不支持带泛型参数的 trait",
        ));
    }
    if let Some(auto) = &item.auto_token {
        return Err(Error::new(auto.span(), "auto trait 无法生成转发桩"));
    }

    let supertraits = classify_supertraits(&item)?;

    let mut methods = Vec::new();
    for trait_item in item.items.iter_mut() {
        match trait_item {
            TraitItem::Fn(method) => methods.push(plan_method(method)?),
            TraitItem::Const(item_const) => {
                return Err(Error::new(
                    item_const.ident.span(),
                    "接口 trait 不支持关联常量，远端调用只能转发方法",
                ));
            }
            TraitItem::Type(item_type) => {
                return Err(Error::new(
                    item_type.ident.span(),
                    "接口 trait 不支持关联类型，转发桩需要对象安全的签名",
                ));
            }
            other => {
                return Err(Error::new(other.span(), "接口 trait 中存在无法转发的成员"));
            }
        }
    }

    let ident = &item.ident;
    let target = format_ident!("__SparkStubTarget");

    let interface_supers: Vec<&Path> = supertraits
        .iter()
        .filter_map(|supertrait| match supertrait {
            Supertrait::Interface(path) => Some(path),
            Supertrait::Plain(_) => None,
        })
        .collect();
    let super_bounds: Vec<TokenStream2> = supertraits
        .iter()
        .map(|supertrait| match supertrait {
            Supertrait::Interface(path) => path.to_token_stream(),
            Supertrait::Plain(bound) => bound.to_token_stream(),
        })
        .collect();

    let method_infos = methods.iter().map(method_info_tokens);
    let forwarders = methods.iter().map(|method| forwarder_tokens(ident, method));

    Ok(quote! {
        #item

        impl ::spark_stub::Interface for dyn #ident {
            const TYPE_INFO: &'static ::spark_stub::TypeInfo = &::spark_stub::TypeInfo {
                identity: ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#ident)),
                kind: ::spark_stub::TypeKind::Interface,
                methods: &[#(#method_infos),*],
                supertraits: &[#(<dyn #interface_supers as ::spark_stub::Interface>::TYPE_INFO),*],
            };

            fn bind(instance: ::spark_stub::StubInstance<Self>) -> ::std::boxed::Box<Self> {
                ::std::boxed::Box::new(instance)
            }
        }

        impl ::spark_stub::Extends<dyn #ident> for dyn #ident {}
        #(impl ::spark_stub::Extends<dyn #interface_supers> for dyn #ident {})*

        impl<#target: ?Sized> #ident for ::spark_stub::StubInstance<#target>
        where
            #target: ::spark_stub::Extends<dyn #ident>,
            #(::spark_stub::StubInstance<#target>: #super_bounds,)*
        {
            #(#forwarders)*
        }
    })
}

fn classify_supertraits(item: &ItemTrait) -> Result<Vec<Supertrait>, Error> {
    let mut supertraits = Vec::new();
    for bound in &item.supertraits {
        match bound {
            TypeParamBound::Trait(trait_bound) => {
                if !matches!(trait_bound.modifier, TraitBoundModifier::None)
                    || trait_bound.lifetimes.is_some()
                {
                    return Err(Error::new(
                        trait_bound.span(),
                        "接口父 trait 不支持 `?` 修饰或高阶生命周期",
                    ));
                }
                let path = &trait_bound.path;
                let plain = path.get_ident().map(|ident| ident.to_string());
                match plain.as_deref() {
                    Some("Send" | "Sync" | "Unpin") => {
                        supertraits.push(Supertrait::Plain(bound.clone()));
                    }
                    Some("Sized") => {
                        return Err(Error::new(
                            path.span(),
                            "`Sized` 父 trait 会破坏对象安全，无法生成转发桩",
                        ));
                    }
                    _ => {
                        if path
                            .segments
                            .iter()
                            .any(|segment| !matches!(segment.arguments, PathArguments::None))
                        {
                            return Err(Error::new(
                                path.span(),
                                "接口父 trait 不支持泛型参数",
                            ));
                        }
                        supertraits.push(Supertrait::Interface(path.clone()));
                    }
                }
            }
            // `'static` 等生命周期约束原样落到 `StubInstance<T>` 的 where 子句上。
            TypeParamBound::Lifetime(_) => supertraits.push(Supertrait::Plain(bound.clone())),
            other => {
                return Err(Error::new(other.span(), "无法识别的父 trait 约束"));
            }
        }
    }
    Ok(supertraits)
}

fn plan_method(method: &mut TraitItemFn) -> Result<MethodPlan, Error> {
    let rename = take_stub_name(&mut method.attrs)?;
    let sig = &mut method.sig;

    if let Some(asyncness) = &sig.asyncness {
        return Err(Error::new(
            asyncness.span(),
            "转发桩方法不支持 async fn：调用会阻塞直到 Invoker 返回",
        ));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(Error::new(variadic.span(), "转发桩方法不支持可变参数"));
    }
    if let Some(param) = sig
        .generics
        .params
        .iter()
        .find(|param| !matches!(param, GenericParam::Lifetime(_)))
    {
        return Err(Error::new(
            param.span(),
            "转发桩方法仅允许生命周期泛型，类型与常量泛型无法对象安全地转发",
        ));
    }

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some()
                && receiver.mutability.is_none()
                && receiver.colon_token.is_none() => {}
        Some(other) => {
            return Err(Error::new(other.span(), "转发桩方法的接收者必须是 `&self`"));
        }
        None => {
            return Err(Error::new(sig.span(), "转发桩方法必须以 `&self` 为接收者"));
        }
    }

    let mut params = Vec::new();
    for (position, input) in sig.inputs.iter_mut().skip(1).enumerate() {
        let pat_type = match input {
            FnArg::Typed(pat_type) => pat_type,
            FnArg::Receiver(receiver) => {
                return Err(Error::new(receiver.span(), "重复的接收者参数"));
            }
        };
        let rename = take_stub_name(&mut pat_type.attrs)?;
        let (name, binding) = match pat_type.pat.as_ref() {
            Pat::Ident(pat_ident) if pat_ident.subpat.is_none() && pat_ident.by_ref.is_none() => (
                Some(pat_ident.ident.unraw().to_string()),
                pat_ident.ident.clone(),
            ),
            _ => (None, format_ident!("__spark_stub_arg{}", position)),
        };
        params.push(ParamPlan {
            binding,
            name,
            rename,
            ty: (*pat_type.ty).clone(),
        });
    }

    let output = extract_ok_type(sig)?.clone();
    let is_void = matches!(&output, Type::Tuple(tuple) if tuple.elems.is_empty());

    let mut impl_sig = sig.clone();
    for (input, param) in impl_sig.inputs.iter_mut().skip(1).zip(&params) {
        if let FnArg::Typed(pat_type) = input {
            pat_type.attrs.clear();
            let binding = &param.binding;
            *pat_type.pat = parse_quote!(#binding);
        }
    }

    Ok(MethodPlan {
        symbol: sig.ident.unraw().to_string(),
        rename,
        params,
        output,
        is_void,
        impl_sig,
    })
}

/// 取出并移除 `#[stub(name = "...")]`，返回其中的名称。
fn take_stub_name(attrs: &mut Vec<Attribute>) -> Result<Option<String>, Error> {
    let mut name = None;
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        if !attr.path().is_ident("stub") {
            kept.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("`name` 不能为空字符串"));
                }
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("#[stub(..)] 仅支持 `name = \"...\"`"))
            }
        })?;
    }
    *attrs = kept;
    Ok(name)
}

fn extract_ok_type(sig: &Signature) -> Result<&Type, Error> {
    match &sig.output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(type_path) => {
                let segment = type_path
                    .path
                    .segments
                    .last()
                    .ok_or_else(|| Error::new(type_path.span(), "返回类型缺失"))?;
                if segment.ident != "Result" {
                    return Err(Error::new(
                        segment.ident.span(),
                        "转发桩方法要求返回 Result<_, _>，以便传播调用失败",
                    ));
                }
                match &segment.arguments {
                    PathArguments::AngleBracketed(args) => match args.args.first() {
                        Some(GenericArgument::Type(ty)) => Ok(ty),
                        _ => Err(Error::new(args.span(), "Result 必须提供返回值类型")),
                    },
                    _ => Err(Error::new(
                        segment.arguments.span(),
                        "Result 泛型参数解析失败",
                    )),
                }
            }
            _ => Err(Error::new(ty.span(), "返回类型需为 Result")),
        },
        ReturnType::Default => Err(Error::new(
            sig.span(),
            "转发桩方法需要返回 Result<_, _>；无返回值请写 Result<(), _>",
        )),
    }
}

fn option_literal(value: &Option<String>) -> TokenStream2 {
    match value {
        Some(value) => quote!(::core::option::Option::Some(#value)),
        None => quote!(::core::option::Option::None),
    }
}

fn type_tag(ty: &Type) -> String {
    ty.to_token_stream().to_string()
}

fn method_info_tokens(method: &MethodPlan) -> TokenStream2 {
    let symbol = &method.symbol;
    let rename = option_literal(&method.rename);
    let params = method.params.iter().map(|param| {
        let name = option_literal(&param.name);
        let rename = option_literal(&param.rename);
        let ty = type_tag(&param.ty);
        quote! {
            ::spark_stub::ParamInfo { name: #name, rename: #rename, ty: #ty }
        }
    });
    let returns = if method.is_void {
        quote!(::core::option::Option::None)
    } else {
        let ty = type_tag(&method.output);
        quote!(::core::option::Option::Some(#ty))
    };
    quote! {
        ::spark_stub::MethodInfo {
            symbol: #symbol,
            rename: #rename,
            parameters: &[#(#params),*],
            returns: #returns,
        }
    }
}

fn forwarder_tokens(interface: &Ident, method: &MethodPlan) -> TokenStream2 {
    let sig = &method.impl_sig;
    let symbol = &method.symbol;
    let capacity = method.params.len();
    let bindings = method.params.iter().map(|param| &param.binding);

    let call = if method.is_void {
        quote! {
            ::spark_stub::StubInstance::call_void(
                self,
                __spark_stub_origin,
                #symbol,
                __spark_stub_arguments,
            )
        }
    } else {
        let output = &method.output;
        quote! {
            ::spark_stub::StubInstance::call::<#output>(
                self,
                __spark_stub_origin,
                #symbol,
                __spark_stub_arguments,
            )
        }
    };

    quote! {
        #sig {
            let __spark_stub_origin =
                <dyn #interface as ::spark_stub::Interface>::TYPE_INFO.identity;
            let __spark_stub_arguments = ::spark_stub::ArgumentList::with_capacity(#capacity)
                #(.push(&#bindings))*;
            #call.map_err(::core::convert::Into::into)
        }
    }
}
