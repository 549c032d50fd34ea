//! Dynamic gRPC client
//!
//! Builds a callable client for any unary RPC of a service known only
//! through its descriptor. Requests and responses cross this boundary as
//! JSON values and are converted with the method's message descriptors.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use http::uri::PathAndQuery;
use prost_reflect::{DynamicMessage, MethodDescriptor, SerializeOptions, ServiceDescriptor};
use serde_json::Value;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::Status;

use crate::common::{Error, Result};

use super::codec::DynamicCodec;
use super::descriptor::{load_descriptor, resolve_service, LoaderOptions};
use super::metadata::Metadata;

/// Outcome of a call that reached the transport: a response body or the
/// status the server (or channel) reported
pub type RpcOutcome = std::result::Result<Value, Status>;

/// Capability set the engine needs from an RPC client
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Whether `method` names a callable RPC on this client
    fn has_method(&self, method: &str) -> bool;

    /// Issue exactly one call
    ///
    /// Local failures (unknown method, a request that does not fit the
    /// method's input type, bad metadata) are `Err`; anything reported by
    /// the transport is `Ok(Err(status))`.
    async fn call(&self, method: &str, request: &Value, metadata: &Metadata) -> Result<RpcOutcome>;
}

/// Transport credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Insecure,
    Tls {
        /// PEM CA bundle; native roots are used when absent
        ca_cert: Option<PathBuf>,
        /// Override for the TLS server name
        domain: Option<String>,
    },
}

/// Client construction options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// Everything needed to construct a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConnectionSpec {
    /// Proto source or encoded descriptor set
    pub descriptor: PathBuf,
    pub loader: LoaderOptions,
    /// Fully-qualified service name, e.g. `helloworld.Greeter`
    pub service: String,
    /// `host:port` or a full URI
    pub host: String,
    pub credentials: Credentials,
    pub options: ClientOptions,
}

/// Construct a client for `spec`
///
/// Loads the descriptor, resolves the service and prepares a lazily
/// connecting channel. Must be called from within a Tokio runtime.
pub fn create_client(spec: &ClientConnectionSpec) -> Result<GrpcClient> {
    let pool = load_descriptor(&spec.descriptor, &spec.loader)?;
    let service = resolve_service(&pool, &spec.service)?;
    let channel = connect_channel(spec)?;

    tracing::info!(
        service = %service.full_name(),
        host = %spec.host,
        methods = service.methods().count(),
        "Created gRPC client"
    );

    Ok(GrpcClient {
        service,
        channel,
        serialize: spec.loader.serialize_options(),
        loader: spec.loader.clone(),
    })
}

fn connect_channel(spec: &ClientConnectionSpec) -> Result<Channel> {
    let tls = matches!(spec.credentials, Credentials::Tls { .. });
    let uri = if spec.host.contains("://") {
        spec.host.clone()
    } else if tls {
        format!("https://{}", spec.host)
    } else {
        format!("http://{}", spec.host)
    };

    let mut endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|e| Error::client_construction(&spec.service, format!("invalid host '{uri}': {e}")))?;

    if let Some(timeout) = spec.options.connect_timeout {
        endpoint = endpoint.connect_timeout(timeout);
    }
    if let Some(timeout) = spec.options.timeout {
        endpoint = endpoint.timeout(timeout);
    }
    if let Some(agent) = &spec.options.user_agent {
        endpoint = endpoint
            .user_agent(agent.as_str())
            .map_err(|e| Error::client_construction(&spec.service, format!("invalid user agent: {e}")))?;
    }

    if let Credentials::Tls { ca_cert, domain } = &spec.credentials {
        let mut config = ClientTlsConfig::new();
        match ca_cert {
            Some(path) => {
                let pem = std::fs::read(path).map_err(|e| Error::FileRead {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })?;
                config = config.ca_certificate(Certificate::from_pem(pem));
            }
            None => config = config.with_native_roots(),
        }
        if let Some(domain) = domain {
            config = config.domain_name(domain.clone());
        }
        endpoint = endpoint
            .tls_config(config)
            .map_err(|e| Error::client_construction(&spec.service, format!("TLS setup failed: {e}")))?;
    }

    Ok(endpoint.connect_lazy())
}

/// Client for one service, dispatching unary calls by method name
#[derive(Debug, Clone)]
pub struct GrpcClient {
    service: ServiceDescriptor,
    channel: Channel,
    serialize: SerializeOptions,
    loader: LoaderOptions,
}

impl GrpcClient {
    fn method(&self, name: &str) -> Option<MethodDescriptor> {
        self.service.methods().find(|m| m.name() == name)
    }
}

#[async_trait]
impl RpcClient for GrpcClient {
    fn has_method(&self, method: &str) -> bool {
        self.method(method).is_some()
    }

    #[tracing::instrument(skip(self, request, metadata), fields(service = %self.service.full_name()))]
    async fn call(&self, method: &str, request: &Value, metadata: &Metadata) -> Result<RpcOutcome> {
        let descriptor = self
            .method(method)
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))?;

        if descriptor.is_client_streaming() || descriptor.is_server_streaming() {
            return Err(Error::UnsupportedMethod(method.to_string()));
        }

        let message = DynamicMessage::deserialize_with_options(
            descriptor.input(),
            request.clone(),
            &self.loader.deserialize_options(),
        )
        .map_err(|e| {
            Error::MalformedPayload(format!(
                "request does not match {}: {}",
                descriptor.input().full_name(),
                e
            ))
        })?;

        let path: PathAndQuery = format!("/{}/{}", self.service.full_name(), descriptor.name())
            .parse()
            .map_err(|e| Error::UnknownMethod(format!("{method} ({e})")))?;

        let request = tonic::Request::from_parts(
            metadata.to_metadata_map()?,
            tonic::Extensions::default(),
            message,
        );

        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        if let Err(e) = grpc.ready().await {
            tracing::debug!(error = %e, "Channel not ready");
            return Ok(Err(Status::unavailable(format!("channel not ready: {e}"))));
        }

        tracing::debug!(%path, "Dispatching unary call");
        let response = match grpc.unary(request, path, DynamicCodec::new(descriptor.output())).await {
            Ok(response) => response,
            Err(status) => {
                tracing::debug!(code = ?status.code(), message = %status.message(), "Call failed");
                return Ok(Err(status));
            }
        };

        let body = response
            .into_inner()
            .serialize_with_options(serde_json::value::Serializer, &self.serialize)
            .map_err(|e| Error::MalformedPayload(format!("response could not be rendered: {e}")))?;

        Ok(Ok(body))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::grpc::descriptor::tests::greeter_proto;
    use prost_reflect::{MessageDescriptor, Value as ProtoValue};
    use serde_json::json;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use std::path::Path;
    use tonic::codegen::{empty_body, Body, BoxFuture, Context, Poll, Service, StdError};
    use tonic::server::{Grpc, NamedService, UnaryService};
    use tonic::transport::server::TcpIncoming;
    use tonic::transport::Server;

    /// Greeter served from its descriptor: every unary method greets the
    /// request's `name`, appending the `x-token` header when present
    #[derive(Clone)]
    struct GreeterServer {
        service: ServiceDescriptor,
    }

    impl NamedService for GreeterServer {
        const NAME: &'static str = "helloworld.v1.Greeter";
    }

    struct Greet {
        output: MessageDescriptor,
    }

    impl UnaryService<DynamicMessage> for Greet {
        type Response = DynamicMessage;
        type Future = BoxFuture<tonic::Response<DynamicMessage>, Status>;

        fn call(&mut self, request: tonic::Request<DynamicMessage>) -> Self::Future {
            let output = self.output.clone();
            Box::pin(async move { greet(output, request) })
        }
    }

    fn greet(
        output: MessageDescriptor,
        request: tonic::Request<DynamicMessage>,
    ) -> std::result::Result<tonic::Response<DynamicMessage>, Status> {
        let token = request
            .metadata()
            .get("x-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let message = request.into_inner();
        let text = |field: &str| {
            message
                .get_field_by_name(field)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default()
        };

        let name = text("name");
        if name.is_empty() {
            return Err(Status::invalid_argument("name is required"));
        }
        let mut greeting = format!("Hello {name}");
        if let Some(token) = token {
            greeting = format!("{greeting} {token}");
        }

        let mut reply = DynamicMessage::new(output);
        reply.set_field_by_name("message", ProtoValue::String(greeting));
        reply.set_field_by_name("mood", ProtoValue::EnumNumber(1));
        reply.set_field_by_name("reply_language", ProtoValue::String(text("language")));
        Ok(tonic::Response::new(reply))
    }

    impl<B> Service<http::Request<B>> for GreeterServer
    where
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, request: http::Request<B>) -> Self::Future {
            let method = request
                .uri()
                .path()
                .rsplit('/')
                .next()
                .and_then(|name| self.service.methods().find(|m| m.name() == name));

            Box::pin(async move {
                let Some(method) = method else {
                    let response = http::Response::builder()
                        .header("grpc-status", (tonic::Code::Unimplemented as i32).to_string())
                        .header("content-type", "application/grpc")
                        .body(empty_body())
                        .unwrap();
                    return Ok(response);
                };
                let mut grpc = Grpc::new(DynamicCodec::new(method.input()));
                let greet = Greet {
                    output: method.output(),
                };
                Ok(grpc.unary(greet, request).await)
            })
        }
    }

    /// Serve the greeter described by `proto` on an ephemeral local port
    pub(crate) async fn serve_greeter(proto: &Path) -> SocketAddr {
        let pool = load_descriptor(proto, &LoaderOptions::default()).unwrap();
        let service = resolve_service(&pool, "helloworld.v1.Greeter").unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let incoming = TcpIncoming::from_listener(listener, true, None).unwrap();

        tokio::spawn(
            Server::builder()
                .add_service(GreeterServer { service })
                .serve_with_incoming(incoming),
        );
        addr
    }

    /// Connection spec for a greeter listening on `addr`
    pub(crate) fn local_spec(path: PathBuf, addr: SocketAddr, loader: LoaderOptions) -> ClientConnectionSpec {
        ClientConnectionSpec {
            loader,
            host: addr.to_string(),
            options: ClientOptions {
                connect_timeout: Some(Duration::from_secs(5)),
                timeout: Some(Duration::from_secs(5)),
                user_agent: Some("grpc-bdd-tests".to_string()),
            },
            ..spec(path, "helloworld.v1.Greeter")
        }
    }

    #[tokio::test]
    async fn test_unary_call_round_trip() {
        let (_dir, path) = greeter_proto();
        let addr = serve_greeter(&path).await;
        let client = create_client(&local_spec(path, addr, LoaderOptions::default())).unwrap();

        let mut metadata = Metadata::new();
        metadata.add("X-Token", "t1");

        // unknown request fields are ignored
        let outcome = client
            .call(
                "SayHello",
                &json!({"name": "alice", "language": "en", "nickname": "al"}),
                &metadata,
            )
            .await
            .unwrap();
        assert_eq!(
            outcome.unwrap(),
            json!({"message": "Hello alice t1", "mood": "MOOD_HAPPY", "replyLanguage": "en"})
        );

        let outcome = client
            .call("SayHello", &json!({"name": ""}), &Metadata::new())
            .await
            .unwrap();
        let status = outcome.unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "name is required");
    }

    #[tokio::test]
    async fn test_loader_options_shape_response() {
        let (_dir, path) = greeter_proto();
        let addr = serve_greeter(&path).await;
        let loader = LoaderOptions {
            keep_case: true,
            defaults: true,
            enum_numbers: true,
            ..LoaderOptions::default()
        };
        let client = create_client(&local_spec(path, addr, loader)).unwrap();

        let outcome = client
            .call("SayHello", &json!({"name": "bob"}), &Metadata::new())
            .await
            .unwrap();
        assert_eq!(
            outcome.unwrap(),
            json!({"message": "Hello bob", "tags": [], "mood": 1, "reply_language": ""})
        );
    }

    fn spec(path: PathBuf, service: &str) -> ClientConnectionSpec {
        ClientConnectionSpec {
            descriptor: path,
            loader: LoaderOptions::default(),
            service: service.to_string(),
            host: "127.0.0.1:1".to_string(),
            credentials: Credentials::Insecure,
            options: ClientOptions {
                connect_timeout: Some(Duration::from_millis(200)),
                ..ClientOptions::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_client_exposes_methods() {
        let (_dir, path) = greeter_proto();
        let client = create_client(&spec(path, "helloworld.v1.Greeter")).unwrap();
        assert!(client.has_method("SayHello"));
        assert!(client.has_method("SayHellos"));
        assert!(!client.has_method("doesNotExist"));
    }

    #[tokio::test]
    async fn test_create_client_unknown_service() {
        let (_dir, path) = greeter_proto();
        let err = create_client(&spec(path, "helloworld.v1.Farewell")).unwrap_err();
        assert!(matches!(err, Error::ClientConstruction { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_create_client_invalid_host() {
        let (_dir, path) = greeter_proto();
        let mut spec = spec(path, "helloworld.v1.Greeter");
        spec.host = "http://bad host".to_string();
        assert!(matches!(
            create_client(&spec),
            Err(Error::ClientConstruction { .. })
        ));
    }

    #[tokio::test]
    async fn test_streaming_methods_are_rejected_locally() {
        let (_dir, path) = greeter_proto();
        let client = create_client(&spec(path, "helloworld.v1.Greeter")).unwrap();
        let result = client
            .call("SayHellos", &serde_json::json!({"name": "a"}), &Metadata::new())
            .await;
        assert!(matches!(result, Err(Error::UnsupportedMethod(_))));
    }

    #[tokio::test]
    async fn test_mistyped_request_is_malformed() {
        let (_dir, path) = greeter_proto();
        let client = create_client(&spec(path, "helloworld.v1.Greeter")).unwrap();
        let result = client
            .call("SayHello", &serde_json::json!({"name": {"nested": true}}), &Metadata::new())
            .await;
        assert!(matches!(result, Err(Error::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_reports_status() {
        let (_dir, path) = greeter_proto();
        let client = create_client(&spec(path, "helloworld.v1.Greeter")).unwrap();
        let outcome = client
            .call("SayHello", &serde_json::json!({"name": "alice"}), &Metadata::new())
            .await
            .unwrap();
        let status = outcome.unwrap_err();
        assert_ne!(status.code(), tonic::Code::Ok);
    }
}
