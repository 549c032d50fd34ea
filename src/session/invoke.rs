//! RPC invocation

use crate::common::{Error, Result};
use crate::grpc::status::code_name;

use super::Session;

impl Session {
    /// Call `rpc` with the pending request message and metadata
    ///
    /// An unknown method fails before anything is sent and leaves the
    /// response state alone. A call the service rejects records its status
    /// and error and is returned as `Error::Invocation`; a successful call
    /// replaces the response message and resets the status to `OK`.
    /// There are no retries.
    #[tracing::instrument(skip(self))]
    pub async fn invoke(&mut self, rpc: &str) -> Result<()> {
        if !self.client.has_method(rpc) {
            return Err(Error::UnknownMethod(rpc.to_string()));
        }

        let outcome = self
            .client
            .call(rpc, &self.request_message, &self.request_metadata)
            .await?;

        match outcome {
            Ok(response) => {
                tracing::debug!(%response, "RPC succeeded");
                self.response_message = response;
                self.response_status = tonic::Code::Ok;
                self.response_error = None;
                Ok(())
            }
            Err(status) => {
                let code = code_name(status.code());
                tracing::debug!(code, message = %status.message(), "RPC failed");
                self.response_status = status.code();
                let message = status.message().to_string();
                self.response_error = Some(status);
                Err(Error::Invocation {
                    code: code.to_string(),
                    message,
                })
            }
        }
    }
}
