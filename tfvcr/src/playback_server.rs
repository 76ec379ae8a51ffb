use crate::{
    cassette::Cassette,
    data::{InteractionData, Origin, RequestDescriptor},
    error::Error,
    util,
};
use futures::channel::oneshot;
use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::task::JoinHandle;

/// Answers requests from a cassette on a local port.
///
/// Requests reach the server with their path only, so the server is told
/// which `Origin` it stands in for and matches as if the request had been
/// sent there.
#[derive(Debug)]
pub struct PlaybackServer {
    addr: SocketAddr,
    state: Arc<Mutex<PlaybackState>>,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<Result<(), hyper::Error>>>,
}

#[derive(Debug)]
struct PlaybackState {
    cassette: Cassette,
    origin: Origin,
    unmatched: Vec<String>,
}

impl PlaybackServer {
    /// Binds an ephemeral port on the loopback interface and starts serving.
    /// Must be called from within a tokio runtime.
    pub async fn start(cassette: Cassette, origin: Origin) -> Result<Self, Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let state = Arc::new(Mutex::new(PlaybackState {
            cassette,
            origin,
            unmatched: Vec::new(),
        }));

        let service_state = state.clone();
        let make_service = make_service_fn(move |_| {
            let state = service_state.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |request| {
                    handle_request(state.clone(), request)
                }))
            }
        });

        let server = Server::try_bind(&addr)?.serve(make_service);
        let addr = server.local_addr();
        let (shutdown, shutdown_signal) = oneshot::channel::<()>();

        let join_handle = tokio::spawn(server.with_graceful_shutdown(async move {
            let _ = shutdown_signal.await;
        }));

        tracing::info!(%addr, "playback server started");

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown),
            join_handle: Some(join_handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://` URL of `path` on this server.
    pub fn url<S: AsRef<str>>(&self, path: S) -> String {
        format!("http://{}{}", self.addr, path.as_ref())
    }

    /// Stops the server and reports every request that could not be
    /// answered from the cassette.
    pub async fn finish(mut self) -> Result<(), Error> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            match join_handle.await {
                Ok(result) => result?,
                Err(e) => {
                    tracing::error!(error = %e, "playback server task failed");
                    return Err(Error::ServerStopped);
                }
            }
        }

        let state = self.state.lock()?;
        let unplayed = state.cassette.unplayed();
        if !unplayed.is_empty() {
            tracing::info!(
                unplayed = unplayed.len(),
                "cassette has interactions that were not replayed"
            );
        }

        if state.unmatched.is_empty() {
            Ok(())
        } else {
            Err(Error::UnmatchedRequests(state.unmatched.clone()))
        }
    }
}

impl Drop for PlaybackServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn handle_request(
    state: Arc<Mutex<PlaybackState>>,
    request: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    match replay(&state, request).await {
        Ok(response) => Ok(response),
        Err(error) => {
            tracing::error!(%error, "couldn't replay request");
            if let Ok(mut state) = state.lock() {
                state.unmatched.push(match &error {
                    Error::NoMatchingInteraction(request) => request.clone(),
                    other => other.to_string(),
                });
            }

            let mut response = Response::new(Body::from(error.to_string()));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            Ok(response)
        }
    }
}

async fn replay(
    state: &Arc<Mutex<PlaybackState>>,
    request: Request<Body>,
) -> Result<Response<Body>, Error> {
    let origin = state.lock()?.origin.clone();
    let live = RequestDescriptor::from_proxied_request(request, &origin).await?;

    let interaction = state.lock()?.cassette.take_match(&live);

    match interaction {
        Some(interaction) => build_response(&interaction),
        None => Err(Error::NoMatchingInteraction(live.summary())),
    }
}

fn build_response(interaction: &InteractionData) -> Result<Response<Body>, Error> {
    let response_data = &interaction.response_data;
    let mut response_builder = Response::builder().status(response_data.status_code);

    util::put_headers(
        response_builder.headers_mut().ok_or(Error::InvalidBody)?,
        util::playback_headers(&response_data.headers),
    )?;

    Ok(response_builder.body(response_data.body.clone().into())?)
}
