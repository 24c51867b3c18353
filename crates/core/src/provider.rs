use std::{
    fmt::Debug,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, ProviderBuilder},
    rpc::{
        client::ClientBuilder,
        json_rpc::{RequestPacket, ResponsePacket},
    },
    signers::local::PrivateKeySigner,
    transports::{TransportError, TransportErrorKind},
};
use tower::{Layer, Service};
use tracing::debug;
use url::Url;

/// Default bound on a single JSON-RPC request.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(45);

/// A layer to be used with `ClientBuilder::layer` that bounds every request with a timeout
/// and logs its latency.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    timeout: Duration,
}

impl TimeoutLayer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TimeoutLayer {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_TIMEOUT)
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            timeout: self.timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
    timeout: Duration,
}

fn method_name(req: &RequestPacket) -> String {
    match req {
        RequestPacket::Single(inner_req) => inner_req.method().to_owned(),
        RequestPacket::Batch(reqs) => format!("batch({})", reqs.len()),
    }
}

impl<S> Service<RequestPacket> for TimeoutService<S>
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError>,
    S::Future: Send + 'static,
    S::Response: Send + 'static + Debug,
    S::Error: Send + 'static + Debug,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let method = method_name(&req);
        let timeout = self.timeout;
        let start_time = tokio::time::Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(res) => {
                    debug!(
                        method,
                        latency_ms = start_time.elapsed().as_millis() as u64,
                        "rpc request completed"
                    );
                    res
                }
                Err(_) => Err(TransportErrorKind::custom_str(&format!(
                    "{method} timed out after {}s",
                    timeout.as_secs()
                ))),
            }
        })
    }
}

/// Connects a signing provider to `rpc_url`; every request is bounded by `timeout`.
pub fn connect_signer(rpc_url: &Url, signer: PrivateKeySigner, timeout: Duration) -> DynProvider {
    let client = ClientBuilder::default()
        .layer(TimeoutLayer::new(timeout))
        .http(rpc_url.to_owned());
    DynProvider::new(
        ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_client(client),
    )
}

#[cfg(test)]
mod tests {
    use super::{TimeoutLayer, DEFAULT_RPC_TIMEOUT};
    use alloy::{
        rpc::json_rpc::{Id, Request, RequestPacket, ResponsePacket},
        transports::{TransportError, TransportErrorKind},
    };
    use std::{
        future::Future,
        pin::Pin,
        task::{Context, Poll},
        time::Duration,
    };
    use tower::{Layer, Service};

    /// Never answers.
    #[derive(Clone)]
    struct Stalled;

    impl Service<RequestPacket> for Stalled {
        type Response = ResponsePacket;
        type Error = TransportError;
        type Future = Pin<Box<dyn Future<Output = Result<ResponsePacket, TransportError>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: RequestPacket) -> Self::Future {
            Box::pin(async {
                futures::future::pending::<()>().await;
                Err(TransportErrorKind::custom_str("unreachable"))
            })
        }
    }

    #[test]
    fn default_timeout_is_bounded() {
        assert_eq!(TimeoutLayer::default().timeout, DEFAULT_RPC_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_request_times_out() {
        let mut svc = TimeoutLayer::new(Duration::from_secs(5)).layer(Stalled);
        let req: Request<()> = Request::new("eth_blockNumber", Id::Number(1), ());
        let packet = RequestPacket::Single(req.serialize().unwrap());
        let err = svc.call(packet).await.unwrap_err();
        assert!(err.to_string().contains("eth_blockNumber timed out after 5s"));
    }
}
