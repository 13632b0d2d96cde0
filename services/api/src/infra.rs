use metrics_exporter_prometheus::PrometheusHandle;
use peer_review::config::ConfigError;
use peer_review::workflows::peer_review::{
    AnalysisRecord, AnalysisStore, SchemeKind, StoreError,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Single-slot analysis store. Uploads replace the slot wholesale.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAnalysisStore {
    record: Arc<Mutex<Option<AnalysisRecord>>>,
}

impl AnalysisStore for InMemoryAnalysisStore {
    fn load(&self) -> Result<Option<AnalysisRecord>, StoreError> {
        let guard = self
            .record
            .lock()
            .map_err(|_| StoreError::Unavailable("analysis store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, record: AnalysisRecord) -> Result<(), StoreError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| StoreError::Unavailable("analysis store mutex poisoned".to_string()))?;
        *guard = Some(record);
        Ok(())
    }
}

pub(crate) fn parse_scheme(raw: &str) -> Result<SchemeKind, ConfigError> {
    SchemeKind::from_label(raw).ok_or_else(|| ConfigError::InvalidScheme(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_starts_empty() {
        let store = InMemoryAnalysisStore::default();
        assert!(store.load().expect("load succeeds").is_none());
    }

    #[test]
    fn scheme_labels_parse() {
        assert_eq!(parse_scheme("Penalty").expect("valid"), SchemeKind::Penalty);
        assert_eq!(parse_scheme("b").expect("valid"), SchemeKind::Bonus);
        match parse_scheme("weighted") {
            Err(ConfigError::InvalidScheme(value)) => assert_eq!(value, "weighted"),
            other => panic!("expected invalid scheme, got {other:?}"),
        }
    }
}
