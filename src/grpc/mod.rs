//! gRPC client construction and transport
//!
//! The engine talks to services only through [`RpcClient`]; this module
//! provides the tonic-backed implementation built from a proto descriptor.

pub mod client;
pub mod codec;
pub mod descriptor;
pub mod metadata;
pub mod status;

pub use client::{
    create_client, ClientConnectionSpec, ClientOptions, Credentials, GrpcClient, RpcClient,
    RpcOutcome,
};
pub use descriptor::LoaderOptions;
pub use metadata::Metadata;
