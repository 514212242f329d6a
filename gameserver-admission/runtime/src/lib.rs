#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use gameserver_admission_k8s_api as k8s;

mod admission;
mod args;
mod metrics;
pub mod validation;

pub use self::{
    admission::Admission,
    args::Args,
    metrics::AdmissionMetrics,
    validation::{PortNamePolicy, Rejection, Validator},
};
