//! The seam between the stateless client and the network.
//!
//! A `Transport` executes one `HttpRequest` and hands back the response as
//! data. Non-2xx statuses are *not* transport errors; status interpretation
//! belongs to `HycomClient::parse_*`.

use std::sync::Arc;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Adapts a closure into a `Transport`, for hosts that already own an HTTP
/// stack and for tests.
pub struct FnTransport<F>(pub F);

impl<F> Transport for FnTransport<F>
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (self.0)(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use std::time::Duration;

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};

    /// Blocking transport backed by a shared `ureq::Agent`.
    ///
    /// The agent is configured so 4xx/5xx responses come back as data.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new(None)
        }
    }

    impl UreqTransport {
        /// `timeout` bounds the whole round-trip; `None` waits indefinitely.
        pub fn new(timeout: Option<Duration>) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut call = self.agent.get(&request.url);
            for (key, value) in &request.headers {
                call = call.header(key.as_str(), value.as_str());
            }
            let mut response = call.call().map_err(map_error)?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect();
            let body = response.body_mut().read_to_string().map_err(map_error)?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn map_error(err: ureq::Error) -> TransportError {
        match &err {
            ureq::Error::Timeout(_) => TransportError::Timeout,
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed | ureq::Error::Io(_) => {
                TransportError::Connection(err.to_string())
            }
            _ => TransportError::Other(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_transport_sees_request() {
        let transport = FnTransport(|req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(200, req.url.clone()))
        });
        let resp = transport.execute(&HttpRequest::get("http://h/x".to_string())).unwrap();
        assert_eq!(resp.body, "http://h/x");
    }

    #[test]
    fn shared_transport_delegates() {
        let transport: Arc<dyn Transport> =
            Arc::new(FnTransport(|_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Err(TransportError::Timeout)
        }));
        let err = (&transport).execute(&HttpRequest::get(String::new())).unwrap_err();
        assert_eq!(err, TransportError::Timeout);
    }
}
