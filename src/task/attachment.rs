use crate::constants::counters;
use crate::types::TabletCommitInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Success artifact of a load task, consumed by the transaction commit protocol.
///
/// Built once from what the coordinator reported; there are no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAttachment {
    signature: i64,
    counters: HashMap<String, String>,
    tracking_url: Option<String>,
    commit_infos: Vec<TabletCommitInfo>,
}

impl TaskAttachment {
    pub fn new(
        signature: i64,
        counters: HashMap<String, String>,
        tracking_url: Option<String>,
        commit_infos: Vec<TabletCommitInfo>,
    ) -> Self {
        Self {
            signature,
            counters,
            tracking_url,
            commit_infos,
        }
    }

    pub fn signature(&self) -> i64 {
        self.signature
    }

    pub fn counters(&self) -> &HashMap<String, String> {
        &self.counters
    }

    pub fn tracking_url(&self) -> Option<&str> {
        self.tracking_url.as_deref()
    }

    pub fn commit_infos(&self) -> &[TabletCommitInfo] {
        &self.commit_infos
    }

    pub fn loaded_rows(&self) -> Option<u64> {
        self.counter(counters::DPP_NORMAL_ALL)
    }

    pub fn filtered_rows(&self) -> Option<u64> {
        self.counter(counters::DPP_ABNORMAL_ALL)
    }

    pub fn unselected_rows(&self) -> Option<u64> {
        self.counter(counters::UNSELECTED_ROWS)
    }

    fn counter(&self, key: &str) -> Option<u64> {
        self.counters.get(key).and_then(|v| v.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_counter_accessors() {
        let counters = HashMap::from([
            (counters::DPP_NORMAL_ALL.to_string(), "1000".to_string()),
            (counters::DPP_ABNORMAL_ALL.to_string(), "3".to_string()),
            (counters::UNSELECTED_ROWS.to_string(), "not-a-number".to_string()),
        ]);
        let attachment = TaskAttachment::new(
            7,
            counters,
            Some("http://be1:8040/api/_load_error_log?file=x".to_string()),
            vec![TabletCommitInfo::new(100, 1)],
        );

        assert_eq!(attachment.signature(), 7);
        assert_eq!(attachment.loaded_rows(), Some(1000));
        assert_eq!(attachment.filtered_rows(), Some(3));
        assert_eq!(attachment.unselected_rows(), None);
        assert_eq!(attachment.commit_infos(), &[TabletCommitInfo::new(100, 1)]);
        assert!(attachment.tracking_url().unwrap().contains("_load_error_log"));
    }

    #[test]
    fn test_serializes_for_commit_protocol() {
        let attachment = TaskAttachment::new(1, HashMap::new(), None, vec![]);
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["signature"], 1);
        assert!(json["tracking_url"].is_null());
    }
}
