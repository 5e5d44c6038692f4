//! Priority shared by tasks and experiments.

use serde::{Deserialize, Serialize};

use super::record::Enumeration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    #[serde(alias = "critical")]
    Urgent,
}

impl Enumeration for Priority {
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High, Self::Urgent];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_matches_domain_order() {
        assert!(Priority::Urgent > Priority::High);
        let mut sorted = Priority::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Priority::ALL);
    }

    #[test]
    fn test_critical_alias() {
        let priority: Priority = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(priority, Priority::Urgent);
        assert_eq!(serde_json::to_string(&priority).unwrap(), "\"urgent\"");
    }
}
