use crate::{
    k8s::{GameServer, Resource, ResourceExt},
    metrics::AdmissionMetrics,
    validation::Validator,
};
use anyhow::{anyhow, Result};
use futures::future;
use http_body_util::BodyExt;
use hyper::{http, Request, Response};
use kube::core::{admission::Operation, DynamicObject};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

#[derive(Clone, Debug)]
pub struct Admission {
    validator: Validator,
    metrics: AdmissionMetrics,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read request body: {0}")]
    Request(#[from] hyper::Error),

    #[error("failed to encode json response: {0}")]
    Json(#[from] serde_json::Error),
}

type Review = kube::core::admission::AdmissionReview<DynamicObject>;
type AdmissionRequest = kube::core::admission::AdmissionRequest<DynamicObject>;
type AdmissionResponse = kube::core::admission::AdmissionResponse;
type AdmissionReview = kube::core::admission::AdmissionReview<DynamicObject>;

type Body = http_body_util::Full<bytes::Bytes>;

// === impl AdmissionService ===

impl tower::Service<Request<hyper::body::Incoming>> for Admission {
    type Response = Response<Body>;
    type Error = Error;
    type Future = future::BoxFuture<'static, Result<Response<Body>, Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<hyper::body::Incoming>) -> Self::Future {
        trace!(?req);
        if req.method() != http::Method::POST || req.uri().path() != "/" {
            return Box::pin(future::ok(
                Response::builder()
                    .status(http::StatusCode::NOT_FOUND)
                    .body(Body::default())
                    .expect("not found response must be valid"),
            ));
        }

        let admission = self.clone();
        Box::pin(async move {
            let bytes = req.into_body().collect().await?.to_bytes();
            json_response(admission.review(&bytes).into_review())
        })
    }
}

impl Admission {
    pub fn new(validator: Validator, metrics: AdmissionMetrics) -> Self {
        Self { validator, metrics }
    }

    /// Decodes an `AdmissionReview` and decides on its request.
    fn review(&self, body: &[u8]) -> AdmissionResponse {
        let review: Review = match serde_json::from_slice(body) {
            Ok(review) => review,
            Err(error) => {
                warn!(%error, "Failed to parse request body");
                self.metrics.invalid("");
                return AdmissionResponse::invalid(error);
            }
        };
        trace!(?review);

        let rsp = match review.try_into() {
            Ok(req) => {
                debug!(?req);
                self.admit(req)
            }
            Err(error) => {
                warn!(%error, "Invalid admission request");
                self.metrics.invalid("");
                AdmissionResponse::invalid(error)
            }
        };
        debug!(?rsp);
        rsp
    }

    fn admit(&self, req: AdmissionRequest) -> AdmissionResponse {
        if is_kind::<GameServer>(&req) {
            return self.admit_game_server(req);
        }

        self.metrics.invalid(&req.kind.kind);
        AdmissionResponse::invalid(format_args!(
            "unsupported resource type: {}.{}.{}",
            req.kind.group, req.kind.version, req.kind.kind
        ))
    }

    fn admit_game_server(&self, req: AdmissionRequest) -> AdmissionResponse {
        let rsp = AdmissionResponse::from(&req);
        let kind = req.kind.kind.clone();

        // Deletes and connects carry no candidate object to validate.
        if matches!(req.operation, Operation::Delete | Operation::Connect) {
            return rsp;
        }

        let gs = match parse_object::<GameServer>(req) {
            Ok(gs) => gs,
            Err(error) => {
                info!(%error, "Failed to parse {}", kind);
                self.metrics.invalid(&kind);
                return rsp.deny(error);
            }
        };

        let ns = gs.namespace().unwrap_or_default();
        let name = gs.name_any();
        if let Err(rejection) = self.validator.validate(&gs) {
            info!(%rejection, %ns, %name, %kind, "Denied");
            self.metrics.denied(&kind, rejection);
            return rsp.deny(rejection);
        }

        self.metrics.admitted(&kind);
        rsp
    }
}

fn is_kind<T>(req: &AdmissionRequest) -> bool
where
    T: Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    req.kind.group.eq_ignore_ascii_case(&T::group(&dt))
        && req.kind.kind.eq_ignore_ascii_case(&T::kind(&dt))
}

fn json_response(rsp: AdmissionReview) -> Result<Response<Body>, Error> {
    let bytes = serde_json::to_vec(&rsp)?;
    Ok(Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("admission review response must be valid"))
}

fn parse_object<T>(req: AdmissionRequest) -> Result<T>
where
    T: Resource + DeserializeOwned,
{
    let obj = req
        .object
        .ok_or_else(|| anyhow!("admission request missing 'object'"))?;
    Ok(obj.try_parse::<T>()?)
}
