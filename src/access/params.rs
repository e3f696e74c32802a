use std::collections::HashMap;

use crate::error::AppError;

/// 一次请求的抽取上下文：路径参数、查询参数和已认证的用户ID。
/// 请求体从不参与访问判定。
#[derive(Debug, Clone)]
pub struct AccessParams {
    path: HashMap<String, String>,
    query: HashMap<String, String>,
    pub user_id: i64,
}

impl AccessParams {
    pub fn new(
        path: HashMap<String, String>,
        query: HashMap<String, String>,
        user_id: i64,
    ) -> Self {
        Self {
            path,
            query,
            user_id,
        }
    }

    /// 必选路径ID，缺失或解析失败都是客户端错误
    pub fn path_id(&self, name: &str) -> Result<i64, AppError> {
        let raw = self
            .path
            .get(name)
            .ok_or_else(|| AppError::validation(format!("{name}: missing path parameter")))?;
        raw.parse::<i64>()
            .map_err(|_| AppError::validation(format!("{name}: not a valid id")))
    }

    /// 必选查询ID
    pub fn query_id(&self, name: &str) -> Result<i64, AppError> {
        let raw = self
            .query
            .get(name)
            .ok_or_else(|| AppError::validation(format!("{name}: missing query parameter")))?;
        raw.parse::<i64>()
            .map_err(|_| AppError::validation(format!("{name}: not a valid id")))
    }

    /// 可空查询ID：缺失是 None，给了但解析不了仍是客户端错误
    pub fn optional_query_id(&self, name: &str) -> Result<Option<i64>, AppError> {
        match self.query.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| AppError::validation(format!("{name}: not a valid id"))),
        }
    }
}
