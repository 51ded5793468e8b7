use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::Context as _;
use axum::Router;
use log::info;
use tower_http::services::ServeDir;

/// Serves `dir` on `0.0.0.0:<port>` until interrupted. This is the
/// container entrypoint after `build` has run.
pub(crate) fn serve(dir: &Path, port: u16) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let app = Router::new().fallback_service(ServeDir::new(dir));
        let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .with_context(|| format!("while binding port {port}"))?;
        info!("serving {:?} on http://0.0.0.0:{}", dir, port);
        axum::serve(listener, app).await?;
        Ok(())
    })
}
