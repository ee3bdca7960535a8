//! # cache 模块说明
//!
//! ## 角色定位（Why）
//! - 每个接口的蓝图只生成一次：反射与构建的代价在首次请求时支付，之后的
//!   `create_instance` 只是一次哈希查找加两次 `Arc` 克隆；
//! - 生成失败同样被缓存，同一接口的后续请求直接得到同一个错误，不会反复重试。
//!
//! ## 并发模型（How）
//! - 存储为 `DashMap<TypeId, Arc<OnceLock<..>>>`：分片锁只在取出或插入单元格时持有，
//!   生成在 `OnceLock::get_or_init` 内执行；
//! - 键是 `dyn Trait` 的 `TypeId`，`TypeInfo::identity` 只出现在日志与错误里；
//! - 同一接口的并发首次请求由 `OnceLock` 串行化，恰好生成一次，所有调用方拿到同一个
//!   `Arc<StubBlueprint>`；不同接口互不阻塞；
//! - 条目惰性创建，永不淘汰。
//!
//! ## 全局实例
//! [`StubCache::global`] 在首次访问时以默认配置创建；需要自定义配置时，必须在任何访问之前调用
//! [`StubCache::install_global`]，否则返回 [`StubError::AlreadyInstalled`]。

use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::config::StubConfig;
use crate::descriptor::TypeInfo;
use crate::error::{GenerationError, StubError};
use crate::generator::{StubBlueprint, build};
use crate::traits::Interface;
use crate::invoker::Invoker;
use crate::reflect::describe;

type Slot = Arc<OnceLock<Result<Arc<StubBlueprint>, GenerationError>>>;

static GLOBAL: OnceLock<StubCache> = OnceLock::new();

/// 以接口类型为键的蓝图缓存。
///
/// # 教案式说明
/// - **契约 (What)**：
///   - [`StubCache::get_or_build`]：首次请求生成并保存结果（成功或失败），之后原样返回；
///   - [`StubCache::create_instance`]：取蓝图并绑定 Invoker，得到 `Box<dyn Trait>`；
/// - **键**：`TypeId::of::<T>()`。同名 trait 即使 `identity` 相同（例如声明在同一模块的
///   不同函数体内），也各自生成独立的蓝图；
/// - **风险 (Trade-offs)**：条目永不淘汰，适合接口集合在编译期确定的场景。
#[derive(Debug, Default)]
pub struct StubCache {
    config: StubConfig,
    entries: DashMap<TypeId, Slot>,
    generations: AtomicUsize,
}

impl StubCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StubConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
            generations: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    /// 进程级共享缓存；未安装时以默认配置惰性创建。
    pub fn global() -> &'static StubCache {
        GLOBAL.get_or_init(StubCache::new)
    }

    /// 以指定配置初始化进程级缓存。
    ///
    /// 只能调用一次，且必须早于任何 [`StubCache::global`] 访问（包括
    /// [`create_instance`] 自由函数），否则返回 [`StubError::AlreadyInstalled`]。
    pub fn install_global(config: StubConfig) -> Result<&'static StubCache, StubError> {
        if GLOBAL.get().is_some() {
            return Err(StubError::AlreadyInstalled);
        }
        GLOBAL
            .set(StubCache::with_config(config))
            .map_err(|_| StubError::AlreadyInstalled)?;
        GLOBAL.get().ok_or(StubError::AlreadyInstalled)
    }

    /// 取得接口 `T` 的蓝图，首次请求时生成。
    pub fn get_or_build<T>(&self) -> Result<Arc<StubBlueprint>, StubError>
    where
        T: Interface + ?Sized,
    {
        let info = T::TYPE_INFO;
        let slot = self.slot(TypeId::of::<T>());

        let mut generated = false;
        let outcome = slot.get_or_init(|| {
            generated = true;
            self.generate(info)
        });
        if !generated {
            tracing::trace!(
                target: "spark_stub::cache",
                interface = info.identity,
                cached_failure = outcome.is_err(),
                "stub cache hit"
            );
        }

        outcome.clone().map_err(StubError::from)
    }

    /// 为接口 `T`（即 `dyn Trait`）创建绑定到 `invoker` 的转发桩。
    ///
    /// 生成失败时 Invoker 不会被调用。
    pub fn create_instance<T, I>(&self, invoker: I) -> Result<Box<T>, StubError>
    where
        T: Interface + ?Sized,
        I: Invoker + 'static,
    {
        self.create_shared::<T>(Arc::new(invoker))
    }

    /// 与 [`StubCache::create_instance`] 相同，但复用已共享的 Invoker。
    pub fn create_shared<T>(&self, invoker: Arc<dyn Invoker>) -> Result<Box<T>, StubError>
    where
        T: Interface + ?Sized,
    {
        let blueprint = self.get_or_build::<T>()?;
        Ok(T::bind(blueprint.instantiate(invoker)))
    }

    /// 已执行的生成次数（含失败）。
    pub fn generations(&self) -> usize {
        self.generations.load(Ordering::Acquire)
    }

    /// 已缓存的接口个数。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn slot(&self, key: TypeId) -> Slot {
        if let Some(existing) = self.entries.get(&key) {
            return Arc::clone(existing.value());
        }
        // 分片写锁在本语句结束时释放，生成不在锁内进行。
        Arc::clone(self.entries.entry(key).or_insert_with(Slot::default).value())
    }

    fn generate(&self, info: &'static TypeInfo) -> Result<Arc<StubBlueprint>, GenerationError> {
        self.generations.fetch_add(1, Ordering::AcqRel);

        let outcome = describe(info, self.config.naming)
            .and_then(|descriptor| build(descriptor, &self.config))
            .map(Arc::new);

        match &outcome {
            Ok(blueprint) => tracing::debug!(
                target: "spark_stub::cache",
                interface = info.identity,
                methods = blueprint.len(),
                "generated stub blueprint"
            ),
            Err(err) => tracing::warn!(
                target: "spark_stub::cache",
                interface = info.identity,
                code = err.code(),
                error = %err,
                "stub generation failed"
            ),
        }
        outcome
    }
}

/// 使用进程级缓存创建转发桩，等价于 `StubCache::global().create_instance::<T, _>(invoker)`。
pub fn create_instance<T, I>(invoker: I) -> Result<Box<T>, StubError>
where
    T: Interface + ?Sized,
    I: Invoker + 'static,
{
    StubCache::global().create_instance::<T, I>(invoker)
}
