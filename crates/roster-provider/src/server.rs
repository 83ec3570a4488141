//! Running the provider: in the foreground, or on a background thread.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::faults::FaultTable;
use crate::routes::{router, ProviderState};

/// Serve `table` on `listener` until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: Arc<ProviderState>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("fault-injection provider listening on http://{}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("provider server failed")?;
    tracing::info!("fault-injection provider on {} stopped", addr);
    Ok(())
}

/// Bind `addr` and serve `table` until Ctrl-C.
pub async fn serve(addr: SocketAddr, table: FaultTable) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    let state = Arc::new(ProviderState::new(table));
    serve_with_shutdown(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("ctrl-c handler failed: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Provider running on its own thread and runtime. Stops on drop.
pub struct ProviderHandle {
    base_url: String,
    state: Arc<ProviderState>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl ProviderHandle {
    /// Start a provider for `table` on an ephemeral localhost port.
    pub fn spawn(table: FaultTable) -> Result<Self> {
        let std_listener =
            std::net::TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
        std_listener.set_nonblocking(true)?;
        let addr = std_listener.local_addr()?;
        let state = Arc::new(ProviderState::new(table));
        let (tx, rx) = oneshot::channel::<()>();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("build provider runtime")?;
        let server_state = Arc::clone(&state);
        let join = thread::Builder::new()
            .name("roster-provider".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let listener = match TcpListener::from_std(std_listener) {
                        Ok(l) => l,
                        Err(e) => {
                            tracing::error!("provider listener setup failed: {}", e);
                            return;
                        }
                    };
                    let shutdown = async {
                        let _ = rx.await;
                    };
                    if let Err(e) = serve_with_shutdown(listener, server_state, shutdown).await {
                        tracing::error!("{:#}", e);
                    }
                });
            })
            .context("spawn provider thread")?;

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(tx),
            join: Some(join),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Employee requests served so far.
    pub fn requests(&self) -> usize {
        self.state.requests()
    }
}

impl Drop for ProviderHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
