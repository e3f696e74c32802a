//! 资源级访问检查的分发层。
//!
//! 受保护的路由声明一个资源类型标签（`AccessKind`），守卫中间件在
//! 处理器执行之前按标签找到唯一注册的检查器，由检查器从路径参数、
//! 查询参数和已认证主体中抽取访问数据（从不读请求体），再对存储做
//! 一次存在性/归属判定。判定为假直接以 403 拒绝，处理器不会执行。
//! 注册表在启动时构建并校验：某个标签没有或有多个检查器都算配置
//! 错误，进程直接失败。
//!
//! 路由级的角色检查在这之前单独进行，两层互不替代。

mod checkers;
mod guard;
mod params;
mod registry;


pub use checkers::{
    CommentChecker, EventChecker, ParticipantChecker, ParticipantRemovalChecker,
    SubscriptionChecker,
};
pub use guard::{guard, protect};
pub use params::AccessParams;
pub use registry::{AccessControl, AccessSetupError};

use async_trait::async_trait;

use crate::error::AppError;
use crate::store::Store;

/// 资源类型标签，封闭枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Event,
    Participant,
    ParticipantRemoval,
    Comment,
    Subscription,
}

impl AccessKind {
    pub const ALL: [AccessKind; 5] = [
        AccessKind::Event,
        AccessKind::Participant,
        AccessKind::ParticipantRemoval,
        AccessKind::Comment,
        AccessKind::Subscription,
    ];
}

/// 每种资源一个检查器：自报类型标签，抽取访问数据并求值布尔谓词
#[async_trait]
pub trait AccessChecker: Send + Sync {
    fn kind(&self) -> AccessKind;

    /// 抽取失败（缺参数、解析不了）返回 Validation，
    /// 谓词本身只回答允许与否
    async fn check(&self, store: &dyn Store, params: &AccessParams) -> Result<bool, AppError>;
}
