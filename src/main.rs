use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use backend::{
    AppState,
    access::{self, AccessControl, AccessKind},
    config::Config,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit, require_admin},
    notify::{self, GatewayMailer, Notifier},
    routes,
    store::{Store, pg::PgStore},
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'events_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 设置 Redis 客户端
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    // 检查器注册表在启动时构建，配置不对直接失败
    let access_control =
        Arc::new(AccessControl::with_default_checkers().expect("invalid access checker setup"));

    // 通知扇出：有界队列加独立 worker，绝不阻塞请求
    let (notifier, notify_rx) = Notifier::channel(config.notify_queue_capacity);
    let mailer = Arc::new(GatewayMailer::new(config.mail_gateway_url.clone()));
    tokio::spawn(notify::run_worker(notify_rx, store.clone(), mailer));

    // 设置应用状态
    let state = AppState {
        store,
        config: config.clone(),
        redis: Arc::new(redis_client.clone()),
        notifier,
        access: access_control,
    };

    // 设置限流器
    let rate_limiter = Arc::new(RateLimiter::new(redis_client, &config));

    // 公开路由：注册/登录和无需认证的读接口
    let public_routes = Router::new()
        .route("/users/register", post(routes::user::register))
        .route("/users/login", post(routes::user::login))
        .route("/public/event", get(routes::public::list_events))
        .route("/public/event/{event_id}", get(routes::public::event_detail))
        .route("/public/categories", get(routes::public::list_categories))
        .route(
            "/public/comment/{event_id}",
            get(routes::public::list_comments),
        )
        .route(
            "/public/organization",
            get(routes::public::list_organizations),
        )
        .route(
            "/public/organization/{org_id}",
            get(routes::public::get_organization),
        )
        .route("/public/user/{user_id}", get(routes::public::get_user))
        .route("/public/template", get(routes::public::list_templates))
        .route(
            "/public/template/{template_id}",
            get(routes::public::get_template),
        );

    // 资源级守卫的路由，按资源类型分组打标签
    let event_guarded = access::protect(
        Router::new().route(
            "/event/{event_id}",
            put(routes::event::update_event).delete(routes::event::delete_event),
        ),
        &state,
        AccessKind::Event,
    );

    let participant_guarded = access::protect(
        Router::new()
            .route(
                "/event/{event_id}/participant",
                delete(routes::event::leave_event),
            )
            .route(
                "/chat/{event_id}",
                get(routes::chat::list_messages).post(routes::chat::create_message),
            )
            .route(
                "/task/{event_id}",
                get(routes::task::list_tasks).post(routes::task::create_task),
            )
            .route(
                "/checklist/{event_id}",
                get(routes::checklist::list_items).post(routes::checklist::create_item),
            )
            .route(
                "/checklist/{event_id}/template/{template_id}",
                post(routes::checklist::apply_template),
            ),
        &state,
        AccessKind::Participant,
    );

    let removal_guarded = access::protect(
        Router::new().route(
            "/event/{event_id}/participant/{participant_id}",
            delete(routes::event::remove_participant),
        ),
        &state,
        AccessKind::ParticipantRemoval,
    );

    let comment_guarded = access::protect(
        Router::new().route(
            "/comment/{comment_id}",
            delete(routes::comment::delete_comment),
        ),
        &state,
        AccessKind::Comment,
    );

    let subscription_guarded = access::protect(
        Router::new().route(
            "/subscriptions/categories/check",
            get(routes::subscription::check_subscription),
        ),
        &state,
        AccessKind::Subscription,
    );

    // 其余认证路由，角色门之外不再挂资源守卫
    let protected_routes = Router::new()
        .route("/users/me", get(routes::user::me))
        .route("/users/profile", put(routes::user::update_profile))
        .route("/event", post(routes::event::create_event))
        .route("/event/mine", get(routes::event::my_events))
        .route("/event/joined", get(routes::event::joined_events))
        .route(
            "/event/{event_id}/participant",
            put(routes::event::join_event),
        )
        .route("/comment", post(routes::comment::create_comment))
        .route(
            "/chat/message/{message_id}",
            put(routes::chat::update_message).delete(routes::chat::delete_message),
        )
        .route(
            "/task/item/{task_id}",
            put(routes::task::update_task).delete(routes::task::delete_task),
        )
        .route(
            "/checklist/item/{item_id}",
            put(routes::checklist::update_item).delete(routes::checklist::delete_item),
        )
        .route(
            "/checklist/item/{item_id}/toggle",
            patch(routes::checklist::toggle_item),
        )
        .route(
            "/subscriptions/categories",
            get(routes::subscription::list_subscriptions),
        )
        .route(
            "/subscriptions/categories/{category_id}",
            post(routes::subscription::subscribe).delete(routes::subscription::unsubscribe),
        )
        .route(
            "/organization",
            post(routes::organization::create_organization),
        )
        .route(
            "/organization/{org_id}",
            put(routes::organization::update_organization)
                .delete(routes::organization::delete_organization),
        )
        .route("/image", post(routes::image::register_image))
        .route("/image/{image_id}", delete(routes::image::delete_image))
        .merge(event_guarded)
        .merge(participant_guarded)
        .merge(removal_guarded)
        .merge(comment_guarded)
        .merge(subscription_guarded);

    // 管理端路由：认证之上再加管理员角色门
    let admin_routes = Router::new()
        .route("/template", post(routes::template::create_template))
        .route(
            "/template/{template_id}",
            put(routes::template::update_template).delete(routes::template::delete_template),
        )
        .route("/admin/statistics", get(routes::admin::statistics))
        .route(
            "/admin/users/{user_id}/roles",
            put(routes::admin::set_user_roles),
        )
        .layer(axum::middleware::from_fn(require_admin));

    // 认证中间件包住所有需要登录的路由
    let authed = protected_routes.merge(admin_routes).layer(
        axum::middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    // 创建基础路由
    let router = Router::new().nest(
        &config.api_base_uri.clone(),
        Router::new().merge(public_routes).merge(authed),
    );

    // 添加日志中间件和限流中间件
    let router = router.layer(axum::middleware::from_fn(log_errors)).layer(
        axum::middleware::from_fn_with_state(rate_limiter, rate_limit),
    );

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        let cors = CorsLayer::permissive();
        router.layer(cors)
    };

    // 添加应用状态
    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
