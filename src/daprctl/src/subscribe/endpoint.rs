use crate::config::Config;
use crate::constants::{socket_file_name, SUBSCRIBE_ENDPOINT};
use crate::subscribe::descriptor::{event_routes, RoutingRules, SubscriptionDescriptor};
use crate::subscribe::error::SubscribeError;
use crate::subscribe::handlers::{events, subscribe};
use crate::subscribe::listener::{BoundAddress, EndpointListener};
use crate::subscribe::sink::{ConsoleEventSink, EventSink};
use crate::subscribe::state::EndpointState;
use axum::routing::{get, post};
use axum::Router;
use daprctl_common::{info_message, Colorize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Everything the operator asked for on the `subscribe` command line.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionOptions {
    pub app_id: String,
    pub pubsub_name: String,
    pub topic: String,
    /// Directory to create the app socket in instead of binding a TCP port.
    pub socket_dir: Option<PathBuf>,
    pub metadata: Map<String, Value>,
    pub routes: Option<RoutingRules>,
}

fn get_router(state: EndpointState, event_routes: &[String]) -> Router {
    let mut router = Router::new().route(SUBSCRIBE_ENDPOINT, get(subscribe));
    for path in event_routes {
        router = router.route(path, post(events));
    }
    router.with_state(state)
}

/// A bound but not yet serving subscription endpoint.
pub struct SubscriptionEndpoint {
    listener: EndpointListener,
    descriptor: Arc<SubscriptionDescriptor>,
    event_routes: Vec<String>,
    sink: Arc<dyn EventSink>,
}

impl SubscriptionEndpoint {
    /// Builds the descriptor, then claims a port (or socket). Invalid routing rules fail here,
    /// before anything is bound.
    pub async fn bind(options: SubscriptionOptions, config: &Config) -> Result<Self, SubscribeError> {
        let descriptor = SubscriptionDescriptor::new(
            options.pubsub_name,
            options.topic,
            options.metadata,
            options.routes.as_ref(),
        )?;
        let event_routes = event_routes(options.routes.as_ref());

        let listener = match options.socket_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => {
                EndpointListener::bind_socket(&dir.join(socket_file_name(&options.app_id, "app")))?
            }
            None => EndpointListener::allocate_port(&config.listen_host).await?,
        };

        Ok(Self {
            listener,
            descriptor: Arc::new(descriptor),
            event_routes,
            sink: Arc::new(ConsoleEventSink),
        })
    }

    pub fn with_sink(mut self, sink: impl EventSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn local_addr(&self) -> Result<BoundAddress, SubscribeError> {
        self.listener.local_addr()
    }

    pub fn descriptor(&self) -> &SubscriptionDescriptor {
        &self.descriptor
    }

    pub fn event_routes(&self) -> &[String] {
        &self.event_routes
    }

    /// Serves until `shutdown` is cancelled. Listener failures are returned, not swallowed.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), SubscribeError> {
        let state = EndpointState::new(self.descriptor, self.sink);
        let router = get_router(state, &self.event_routes);

        match self.listener {
            EndpointListener::Tcp(listener) => axum::serve(listener, router)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
                .map_err(SubscribeError::Listener)?,
            #[cfg(unix)]
            EndpointListener::Unix(listener, path) => {
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(shutdown.cancelled_owned())
                    .await;
                if let Err(e) = std::fs::remove_file(&path) {
                    debug!("failed to remove socket {:?}: {}", path, e);
                }
                result.map_err(SubscribeError::Listener)?
            }
        }

        debug!("subscription endpoint stopped");
        Ok(())
    }

    /// Starts serving in the background and hands back the address straight away.
    pub fn start(self) -> Result<RunningEndpoint, SubscribeError> {
        let address = self.local_addr()?;
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(self.run(shutdown.clone()));

        info!("subscription endpoint listening on {}", address);
        Ok(RunningEndpoint {
            address,
            shutdown,
            handle,
        })
    }
}

/// Handle to an endpoint serving in the background.
pub struct RunningEndpoint {
    address: BoundAddress,
    shutdown: CancellationToken,
    handle: JoinHandle<Result<(), SubscribeError>>,
}

impl RunningEndpoint {
    pub fn address(&self) -> &BoundAddress {
        &self.address
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Waits for the listener to finish, whether by shutdown or failure.
    pub async fn wait(self) -> Result<(), SubscribeError> {
        self.handle.await?
    }

    pub async fn shutdown(self) -> Result<(), SubscribeError> {
        self.shutdown.cancel();
        self.wait().await
    }
}

/// Binds, serves, and blocks until Ctrl-C.
pub async fn serve(options: SubscriptionOptions, config: &Config) -> Result<(), SubscribeError> {
    let topic = options.topic.clone();
    let running = SubscriptionEndpoint::bind(options, config).await?.start()?;
    info_message!(
        "Subscribed to topic {}, listening on {}. Press Ctrl-C to stop.",
        topic,
        running.address()
    );

    let shutdown = running.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping subscription endpoint");
            shutdown.cancel();
        }
    });

    running.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct ChannelSink(mpsc::UnboundedSender<(String, Value)>);

    impl EventSink for ChannelSink {
        fn deliver(&self, route: &str, event: Value) {
            let _ = self.0.send((route.to_string(), event));
        }
    }

    fn options(metadata: Value, routes: Option<Value>) -> SubscriptionOptions {
        SubscriptionOptions {
            app_id: "subscriber".to_string(),
            pubsub_name: "orders".to_string(),
            topic: "checkout".to_string(),
            socket_dir: None,
            metadata: metadata.as_object().cloned().unwrap_or_default(),
            routes: routes.map(RoutingRules::new),
        }
    }

    async fn start(
        options: SubscriptionOptions,
    ) -> (RunningEndpoint, mpsc::UnboundedReceiver<(String, Value)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let running = SubscriptionEndpoint::bind(options, &Config::default())
            .await
            .unwrap()
            .with_sink(ChannelSink(tx))
            .start()
            .unwrap();
        (running, rx)
    }

    fn url(running: &RunningEndpoint, path: &str) -> String {
        format!("{}{}", running.address(), path)
    }

    #[tokio::test]
    async fn test_probe_returns_single_descriptor() {
        let (running, _rx) = start(options(json!({"rawPayload": "true"}), None)).await;
        assert!(running.address().port().is_some_and(|port| port != 0));

        let client = reqwest::Client::new();
        for _ in 0..3 {
            let response = client
                .get(url(&running, "/dapr/subscribe"))
                .send()
                .await
                .unwrap();

            assert_eq!(response.status(), 200);
            assert_eq!(
                response.headers()["content-type"],
                "application/json"
            );
            assert_eq!(
                response.text().await.unwrap(),
                r#"[{"pubsubname":"orders","topic":"checkout","route":"/events","metadata":{"rawPayload":"true"}}]"#
            );
        }

        running.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_with_routing_rules() {
        let rules = json!({"rules": [{"match": "true", "path": "/widgets"}], "default": "/products"});
        let (running, _rx) = start(options(json!({}), Some(rules.clone()))).await;

        let body: Value = reqwest::get(url(&running, "/dapr/subscribe"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let descriptors = body.as_array().unwrap();
        assert_eq!(descriptors.len(), 1);
        let route: Value = serde_json::from_str(descriptors[0]["route"].as_str().unwrap()).unwrap();
        assert_eq!(route, rules);

        running.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_mounts_rule_paths() {
        let rules = json!({
            "rules": [
                {"match": "event.type == 'widget'", "path": "/widgets"},
                {"match": "true", "path": "/dapr/subscribe"}
            ],
            "default": "/products"
        });
        let endpoint =
            SubscriptionEndpoint::bind(options(json!({}), Some(rules.clone())), &Config::default())
                .await
                .unwrap();

        assert_eq!(endpoint.event_routes(), &["/events", "/widgets", "/products"]);
        assert_eq!(endpoint.descriptor().topic, "checkout");
        let route: Value = serde_json::from_str(&endpoint.descriptor().route).unwrap();
        assert_eq!(route, rules);
    }

    #[tokio::test]
    async fn test_events_are_delivered() {
        let (running, mut rx) = start(options(json!({}), None)).await;

        let response = reqwest::Client::new()
            .post(url(&running, "/events"))
            .json(&json!({"id": "1", "data": {"orderId": 42}}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let (route, event) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(route, "/events");
        assert_eq!(event["data"]["orderId"], 42);

        running.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_events_still_succeed() {
        let (running, mut rx) = start(options(json!({}), None)).await;

        let response = reqwest::Client::new()
            .post(url(&running, "/events"))
            .body("definitely not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert!(rx.try_recv().is_err());

        running.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_rule_paths_accept_events() {
        let rules = json!({"rules": [{"match": "true", "path": "/widgets"}], "default": "/products"});
        let (running, mut rx) = start(options(json!({}), Some(rules))).await;
        let client = reqwest::Client::new();

        for path in ["/widgets", "/products", "/events"] {
            let response = client
                .post(url(&running, path))
                .json(&json!({"path": path}))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 200);

            let (route, event) = rx.recv().await.unwrap();
            assert_eq!(route, path);
            assert_eq!(event["path"], path);
        }

        running.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_two_endpoints_in_one_process() {
        let (first, _rx1) = start(options(json!({}), None)).await;
        let mut second_options = options(json!({}), None);
        second_options.topic = "refunds".to_string();
        let (second, _rx2) = start(second_options).await;

        assert_ne!(first.address(), second.address());

        let body: Value = reqwest::get(url(&second, "/dapr/subscribe"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body[0]["topic"], "refunds");

        first.shutdown().await.unwrap();
        second.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_releases_the_port() {
        let (running, _rx) = start(options(json!({}), None)).await;
        let address = running.address().clone();

        running.shutdown().await.unwrap();

        let result = reqwest::Client::new()
            .get(format!("{}/dapr/subscribe", address))
            .timeout(Duration::from_secs(2))
            .send()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (running, _rx) = start(options(json!({}), None)).await;

        let response = reqwest::get(url(&running, "/nope")).await.unwrap();
        assert_eq!(response.status(), 404);

        running.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_port_allocation_failure() {
        let config = Config {
            listen_host: "203.0.113.1".to_string(),
            ..Config::default()
        };

        let result = SubscriptionEndpoint::bind(options(json!({}), None), &config).await;
        assert!(matches!(result, Err(SubscribeError::PortAllocation(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_socket_endpoint() {
        use http_body_util::{BodyExt, Empty};
        use hyper_util::rt::TokioIo;

        let dir = tempfile::tempdir().unwrap();
        let mut socket_options = options(json!({}), None);
        socket_options.socket_dir = Some(dir.path().to_path_buf());

        let (running, _rx) = start(socket_options).await;
        let socket_path = dir.path().join("dapr-subscriber-app.socket");
        assert_eq!(running.address(), &BoundAddress::Unix(socket_path.clone()));

        let stream = tokio::net::UnixStream::connect(&socket_path).await.unwrap();
        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::spawn(connection);

        let request = hyper::Request::builder()
            .uri("/dapr/subscribe")
            .header(hyper::header::HOST, "localhost")
            .body(Empty::<bytes::Bytes>::new())
            .unwrap();
        let response = sender.send_request(request).await.unwrap();
        assert_eq!(response.status(), 200);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let descriptors: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(descriptors[0]["pubsubname"], "orders");

        running.shutdown().await.unwrap();
        assert!(!socket_path.exists());
    }
}
