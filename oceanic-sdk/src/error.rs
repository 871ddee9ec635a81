//! Structured error envelope returned by the Ocean control plane.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code the control plane answers with when a cluster id no longer
/// resolves to a live cluster.
pub const ERR_CODE_CLUSTER_NOT_FOUND: &str = "CLUSTER_DOESNT_EXIST";

/// Error code for a request that referenced an invalid parameter value.
pub const ERR_CODE_INVALID_PARAMETER: &str = "InvalidParameterValue";

/// One error item in the control plane's error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorItem {
    pub code: String,
    pub message: String,
}

/// The control plane's structured error list.
///
/// Every failed API call answers with one or more coded items; helpers below
/// classify the classes the lifecycle controller cares about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_items(.items))]
pub struct ApiError {
    pub items: Vec<ApiErrorItem>,
}

fn render_items(items: &[ApiErrorItem]) -> String {
    if items.is_empty() {
        return "unknown API error".to_string();
    }
    items
        .iter()
        .map(|item| format!("{}: {}", item.code, item.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    /// Build an error carrying a single coded item.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            items: vec![ApiErrorItem {
                code: code.into(),
                message: message.into(),
            }],
        }
    }

    pub fn from_items(items: Vec<ApiErrorItem>) -> Self {
        Self { items }
    }

    /// Shorthand for the cluster-not-found class.
    pub fn cluster_not_found(cluster_id: &str) -> Self {
        Self::new(
            ERR_CODE_CLUSTER_NOT_FOUND,
            format!("cluster {cluster_id} does not exist"),
        )
    }

    /// Whether any item carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.items.iter().any(|item| item.code == code)
    }

    /// The read-side "gone" class: the cluster id no longer resolves.
    pub fn is_cluster_not_found(&self) -> bool {
        self.has_code(ERR_CODE_CLUSTER_NOT_FOUND)
    }

    /// The create-side class for a launch profile the control plane cannot
    /// resolve. This cannot self-resolve by waiting, so create never retries
    /// it.
    pub fn is_invalid_launch_profile(&self) -> bool {
        self.items.iter().any(|item| {
            item.code == ERR_CODE_INVALID_PARAMETER
                && item.message.contains("Invalid launch profile")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_all_items() {
        let err = ApiError::from_items(vec![
            ApiErrorItem {
                code: "A".into(),
                message: "first".into(),
            },
            ApiErrorItem {
                code: "B".into(),
                message: "second".into(),
            },
        ]);
        assert_eq!(err.to_string(), "A: first; B: second");
    }

    #[test]
    fn not_found_classification() {
        let err = ApiError::cluster_not_found("o-1");
        assert!(err.is_cluster_not_found());
        assert!(!err.is_invalid_launch_profile());
    }

    #[test]
    fn invalid_launch_profile_requires_code_and_message() {
        let matching = ApiError::new(
            ERR_CODE_INVALID_PARAMETER,
            "Invalid launch profile: arn:profile/missing",
        );
        assert!(matching.is_invalid_launch_profile());

        // same code, unrelated message
        let other = ApiError::new(ERR_CODE_INVALID_PARAMETER, "Invalid subnet");
        assert!(!other.is_invalid_launch_profile());
    }
}
