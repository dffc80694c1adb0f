use marketedge_api::config::AppConfig;

#[tokio::main]
async fn main() {
    marketedge_observability::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let bind_addr = config.bind_addr.clone();

    let app = marketedge_api::app::build_app(config).expect("failed to build application");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
