use std::{future::Future, net::SocketAddr};

use tokio::net::TcpListener;

use crate::ArmUiResult;

use super::{create_router, ServerState};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The dashboard's HTTP server.
pub struct ArmUiServer {
    /// Shared state handed to every request.
    state: ServerState,

    /// Address to listen on.
    addr: SocketAddr,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ArmUiServer {
    /// Creates a server that will listen on `addr`.
    pub fn new(state: ServerState, addr: SocketAddr) -> Self {
        Self { state, addr }
    }

    /// Binds and serves until `shutdown` resolves, then returns the state for cleanup.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> ArmUiResult<ServerState> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("server listening on {}", listener.local_addr()?);

        serve_on(listener, self.state.clone(), shutdown).await?;

        tracing::info!("server stopped");
        Ok(self.state)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Serves the API on an already bound listener until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    state: ServerState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> ArmUiResult<()> {
    let app = create_router(state);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
