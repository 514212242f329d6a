use crate::validation::Rejection;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub struct AdmissionMetrics {
    reviews: Family<ReviewLabels, Counter>,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct ReviewLabels {
    kind: String,
    result: &'static str,
}

// === AdmissionMetrics ===

impl AdmissionMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let reviews = Family::<ReviewLabels, Counter>::default();
        reg.register(
            "reviews",
            "Total number of admission reviews, by resource kind and result",
            reviews.clone(),
        );

        Self { reviews }
    }

    pub(crate) fn admitted(&self, kind: &str) {
        self.inc(kind, "admitted");
    }

    pub(crate) fn denied(&self, kind: &str, rejection: Rejection) {
        self.inc(kind, rejection.as_str());
    }

    /// Counts requests that could not be decoded (with an empty `kind`) or are
    /// of an unsupported kind.
    pub(crate) fn invalid(&self, kind: &str) {
        self.inc(kind, "invalid");
    }

    fn inc(&self, kind: &str, result: &'static str) {
        self.reviews
            .get_or_create(&ReviewLabels {
                kind: kind.to_string(),
                result,
            })
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(reg: &Registry) -> String {
        let mut buf = String::new();
        prometheus_client::encoding::text::encode(&mut buf, reg).expect("metrics must encode");
        buf
    }

    #[test]
    fn counts_by_result() {
        let mut prom = Registry::default();
        let metrics = AdmissionMetrics::register(prom.sub_registry_with_prefix("admission"));

        metrics.admitted("GameServer");
        metrics.admitted("GameServer");
        metrics.denied("GameServer", Rejection::PortExposure);
        metrics.invalid("Pod");

        let text = encode(&prom);
        assert!(
            text.contains(r#"admission_reviews_total{kind="GameServer",result="admitted"} 2"#),
            "{text}"
        );
        assert!(
            text.contains(r#"admission_reviews_total{kind="GameServer",result="port_exposure"} 1"#),
            "{text}"
        );
        assert!(
            text.contains(r#"admission_reviews_total{kind="Pod",result="invalid"} 1"#),
            "{text}"
        );
    }
}
