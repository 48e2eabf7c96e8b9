use axum::{
    Router,
    middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{auth, dashboard, expenses, incomes, savings, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: Arc<auth::AuthProvider>,
}

pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/users",
            get(users::profile).put(users::update_profile),
        )
        .route("/admin/users", get(users::admin_list))
        .route(
            "/admin/users/{id}",
            get(users::admin_get)
                .put(users::admin_update)
                .delete(users::admin_remove),
        )
        .route("/admin/summary", get(users::admin_summary))
        .route("/incomes", post(incomes::create).get(incomes::list))
        .route(
            "/incomes/{id}",
            get(incomes::get_one)
                .put(incomes::update)
                .delete(incomes::remove),
        )
        .route("/incomes/source/{source}", get(incomes::by_source))
        .route("/expenses", post(expenses::create).get(expenses::list))
        .route("/expenses/total", get(expenses::total))
        .route("/expenses/category/{category}", get(expenses::by_category))
        .route(
            "/expenses/{id}",
            get(expenses::get_one)
                .put(expenses::update)
                .delete(expenses::remove),
        )
        .route("/savings", post(savings::create).get(savings::list))
        .route(
            "/savings/{id}",
            get(savings::get_one)
                .put(savings::update)
                .delete(savings::remove),
        )
        .route("/dashboard/balance", get(dashboard::balance))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        auth: Arc::new(auth::AuthProvider::new(db)),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
