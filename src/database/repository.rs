//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了基于Sea-ORM的持久存储层，支持 PostgreSQL、MySQL 和 SQLite。

use super::connection_string::{ensure_database_directory, is_sqlite_memory, DbType};
use super::entity::{self, Column, Entity};
use crate::client::FlagStore;
use crate::config::StoreConfig;
use crate::error::{FlagError, Result};
use crate::model::Flag;
use crate::utils::redaction::redact_connection_string;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, QueryOrder,
    Schema,
};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// 持久存储层
///
/// 开关的权威来源，表 `feature_flags(key PRIMARY KEY, enabled, description)`。
/// 写入为 upsert，删除幂等。
#[derive(Clone, Debug)]
pub struct FlagRepository {
    db: DatabaseConnection,
}

impl FlagRepository {
    /// 使用已有连接创建存储层
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 按配置建立连接池
    ///
    /// SQLite 只使用单个连接；内存库的每个连接都是独立的数据库
    #[instrument(skip(config), level = "info", name = "init_flag_repository")]
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let raw = config.url.expose_secret();
        let url = ensure_database_directory(raw)?;
        let db_type = DbType::from_connection_string(&url);

        let mut opt = ConnectOptions::new(url.clone());
        opt.connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .sqlx_logging(false);
        if db_type == DbType::SQLite {
            opt.max_connections(1).min_connections(1);
            if is_sqlite_memory(&url) {
                // 内存库在连接关闭后即丢失，连接不能被回收
                let forever = Duration::from_secs(u32::MAX as u64);
                opt.idle_timeout(forever).max_lifetime(forever);
            }
        } else {
            opt.max_connections(config.max_connections)
                .min_connections(config.min_connections);
        }

        let db = Database::connect(opt).await.map_err(FlagError::from_db)?;
        info!(
            "Connected to {:?} durable store at {}",
            db_type,
            redact_connection_string(&url)
        );

        let repository = Self::new(db);
        if config.auto_migrate {
            repository.ensure_schema().await?;
        }
        Ok(repository)
    }

    /// 如果表不存在则创建
    #[instrument(skip(self), level = "info")]
    pub async fn ensure_schema(&self) -> Result<()> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(Entity);
        stmt.if_not_exists();
        self.db
            .execute(backend.build(&stmt))
            .await
            .map_err(FlagError::from_db)?;
        debug!("feature_flags table is present");
        Ok(())
    }

    /// 获取底层连接
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl FlagStore for FlagRepository {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<Flag>> {
        let model = Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(FlagError::from_db)?;
        debug!("durable get: key={}, found={}", key, model.is_some());
        Ok(model.map(Flag::from))
    }

    #[instrument(skip(self, flag), level = "debug", fields(key = %flag.key))]
    async fn set(&self, flag: &Flag) -> Result<()> {
        let model = entity::ActiveModel::from(flag);
        Entity::insert(model)
            .on_conflict(
                OnConflict::column(Column::Key)
                    .update_columns([Column::Enabled, Column::Description])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(FlagError::from_db)?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_all(&self) -> Result<Vec<Flag>> {
        let models = Entity::find()
            .order_by_asc(Column::Key)
            .all(&self.db)
            .await
            .map_err(FlagError::from_db)?;
        Ok(models.into_iter().map(Flag::from).collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<()> {
        let result = Entity::delete_by_id(key.to_string())
            .exec(&self.db)
            .await
            .map_err(FlagError::from_db)?;
        debug!("durable delete: key={}, rows={}", key, result.rows_affected);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(FlagError::from_db)
    }
}
