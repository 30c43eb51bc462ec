//! 对象缓存
//!
//! 通过插件注册表选择缓存后端，目前内置 Moka 内存缓存。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
}

/// 注册内置缓存插件，需在创建缓存实例前调用
pub fn register_builtin_plugins() {
    let moka: register::ObjectCacheConstructor = std::sync::Arc::new(|| {
        Box::pin(async {
            object_cache::moka::MokaCacheWrapper::new()
                .map(|cache| Box::new(cache) as Box<dyn ObjectCache>)
                .map_err(crate::errors::ExamSystemError::cache_connection)
        }) as register::BoxedObjectCacheFuture
    });
    register::register_object_cache_plugin("moka", moka);
}
