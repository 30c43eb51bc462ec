//! 缓存后端插件注册表
//!
//! 启动时由 [`super::register_builtin_plugins`] 填充，按 `cache.type` 配置名查找构造器。

use crate::cache::ObjectCache;
use crate::errors::Result;
use once_cell::sync::Lazy;
use std::{
    collections::BTreeMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock, RwLockReadGuard},
};

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

static OBJECT_CACHE_REGISTRY: Lazy<RwLock<BTreeMap<String, ObjectCacheConstructor>>> =
    Lazy::new(|| RwLock::new(BTreeMap::new()));

// 注册表只存放构造器，锁中毒后数据仍然可用
fn read_registry() -> RwLockReadGuard<'static, BTreeMap<String, ObjectCacheConstructor>> {
    OBJECT_CACHE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 注册缓存后端，同名插件会被覆盖
pub fn register_object_cache_plugin<S: Into<String>>(name: S, constructor: ObjectCacheConstructor) {
    let name = name.into().to_ascii_lowercase();
    OBJECT_CACHE_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(name, constructor);
}

/// 按名称查找缓存后端（不区分大小写）
pub fn get_object_cache_plugin(name: &str) -> Option<ObjectCacheConstructor> {
    read_registry().get(&name.to_ascii_lowercase()).cloned()
}

/// 已注册的后端名称，按字母序
pub fn registered_plugins() -> Vec<String> {
    read_registry().keys().cloned().collect()
}

pub fn debug_object_cache_registry() {
    let names = registered_plugins();
    if names.is_empty() {
        tracing::debug!("No object cache plugins registered");
    } else {
        tracing::debug!("Registered object cache plugins: {}", names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_moka_is_registered() {
        crate::cache::register_builtin_plugins();

        assert!(registered_plugins().contains(&"moka".to_string()));
        let constructor = get_object_cache_plugin("MOKA").expect("moka plugin");
        let cache = constructor().await.expect("moka cache");
        cache.insert_raw("k".to_string(), "v".to_string(), 60).await;
        assert_eq!(
            cache.get_raw("k").await,
            crate::cache::CacheResult::Found("v".to_string())
        );
    }

    #[test]
    fn test_unknown_plugin() {
        assert!(get_object_cache_plugin("memcached").is_none());
    }
}
