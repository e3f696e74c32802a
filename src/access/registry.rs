use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::checkers::{
    CommentChecker, EventChecker, ParticipantChecker, ParticipantRemovalChecker,
    SubscriptionChecker,
};
use super::{AccessChecker, AccessKind, AccessParams};
use crate::error::AppError;
use crate::store::Store;

/// 注册表构建失败即配置错误，进程启动时就该失败
#[derive(Debug, Error)]
pub enum AccessSetupError {
    #[error("duplicate access checker for {0:?}")]
    Duplicate(AccessKind),
    #[error("no access checker registered for {0:?}")]
    Missing(AccessKind),
}

/// 标签到检查器的映射，启动时构建一次
pub struct AccessControl {
    checkers: HashMap<AccessKind, Arc<dyn AccessChecker>>,
}

impl std::fmt::Debug for AccessControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessControl")
            .field("checkers", &self.checkers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AccessControl {
    pub fn new(checkers: Vec<Arc<dyn AccessChecker>>) -> Result<Self, AccessSetupError> {
        let mut map: HashMap<AccessKind, Arc<dyn AccessChecker>> = HashMap::new();
        for checker in checkers {
            let kind = checker.kind();
            if map.insert(kind, checker).is_some() {
                return Err(AccessSetupError::Duplicate(kind));
            }
        }
        for kind in AccessKind::ALL {
            if !map.contains_key(&kind) {
                return Err(AccessSetupError::Missing(kind));
            }
        }
        Ok(Self { checkers: map })
    }

    /// 全量默认检查器
    pub fn with_default_checkers() -> Result<Self, AccessSetupError> {
        Self::new(vec![
            Arc::new(EventChecker),
            Arc::new(ParticipantChecker),
            Arc::new(ParticipantRemovalChecker),
            Arc::new(CommentChecker),
            Arc::new(SubscriptionChecker),
        ])
    }

    /// 谓词为假以 AccessDenied 拒绝，处理器不会被调用
    pub async fn authorize(
        &self,
        kind: AccessKind,
        store: &dyn Store,
        params: &AccessParams,
    ) -> Result<(), AppError> {
        let checker = self.checkers.get(&kind).ok_or_else(|| {
            // new() 校验过全量覆盖，走到这里说明构建流程被绕过了
            AppError::Internal(format!("no checker for {:?}", kind))
        })?;

        if checker.check(store, params).await? {
            Ok(())
        } else {
            tracing::warn!(
                "access denied: kind={:?}, user_id={}",
                kind,
                params.user_id
            );
            Err(AppError::access_denied("insufficient rights for this resource"))
        }
    }
}
