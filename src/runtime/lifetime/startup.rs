use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{ExamSystemError, Result};
use crate::grading::{GradingEngine, GradingPolicy};
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::sweeper::spawn_overdue_sweeper;

const FALLBACK_CACHE: &str = "moka";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub engine: Arc<GradingEngine>,
}

async fn build_cache(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        ExamSystemError::cache_plugin_not_found(format!("Cache backend '{name}' not registered"))
    })?;
    let cache = constructor().await?;
    Ok(Arc::from(cache))
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = AppConfig::get().cache.cache_type.to_ascii_lowercase();

    warn!("Attempting to create {} cache backend", cache_type);
    match build_cache(&cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != FALLBACK_CACHE => {
            warn!("{}; falling back to {} cache", e, FALLBACK_CACHE);
            build_cache(FALLBACK_CACHE).await
        }
        Err(e) => Err(e),
    }
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何用户，则创建一个默认的 admin 账号
async fn seed_admin(storage: &Arc<dyn Storage>) -> Result<()> {
    let count = storage.count_users().await?;
    if count > 0 {
        debug!("Database already has {} user(s), skipping admin seed", count);
        return Ok(());
    }
    info!("No users found in database, creating default admin account...");

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let admin = storage
        .create_user(CreateUserRequest {
            username: "admin".to_string(),
            email: "admin@localhost".to_string(),
            password: hash_password(&password)?,
            role: UserRole::Admin,
            display_name: Some("Administrator".to_string()),
        })
        .await?;

    info!(
        "Default admin account created successfully (ID: {}, username: {})",
        admin.id, admin.username
    );
    Ok(())
}

/// 准备服务器启动的上下文
/// 包括存储、缓存、阅卷引擎与后台逾期扫描
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，说明已有可用的 provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    crate::cache::register_builtin_plugins();
    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
    }

    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认管理员账号（如果需要）
    if let Err(e) = seed_admin(&storage).await {
        warn!("Failed to seed admin account: {}", e);
    }

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    let policy = GradingPolicy::from_config(config)?;
    info!(
        "Grading policy: tolerance {}, {} examiner(s) per block, third round priority {}, due after {}h",
        policy.tolerance,
        policy.default_examiners_per_block,
        policy.third_round_priority,
        policy.assignment_due_hours
    );
    let engine = Arc::new(GradingEngine::new(storage.clone(), policy));

    spawn_overdue_sweeper(engine.clone(), config.grading.overdue_sweep_interval_secs);

    Ok(StartupContext {
        storage,
        cache,
        engine,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[test]
    fn test_generated_password_length_and_charset() {
        let pwd = generate_random_password(16);
        assert_eq!(pwd.chars().count(), 16);
        assert!(pwd.chars().all(|c| c.is_ascii_graphic()));
    }

    #[tokio::test]
    async fn test_seed_admin_only_once() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.expect("storage"));

        seed_admin(&storage).await.expect("first seed");
        seed_admin(&storage).await.expect("second seed");

        assert_eq!(storage.count_users().await.expect("count"), 1);
        let admin = storage
            .get_user_by_username("admin")
            .await
            .expect("lookup")
            .expect("admin exists");
        assert_eq!(admin.role, UserRole::Admin);
    }
}
