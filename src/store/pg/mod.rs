mod chat;
mod checklist;
mod comment;
mod event;
mod image;
mod organization;
mod stats;
mod subscription;
mod task;
mod template;
mod user;

use sqlx::PgPool;

use crate::error::AppError;

/// Postgres 存储实现。运行期绑定参数查询，多步写操作走事务
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// 唯一约束冲突翻译成 Conflict，其余照常向上抛
pub(crate) fn conflict_on_unique(e: sqlx::Error, msg: &str) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return AppError::conflict(msg);
        }
    }
    AppError::Database(e)
}
