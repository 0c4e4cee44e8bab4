//! Target identity resolution from page-style query strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity resolution error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("missing required query parameter `{0}`")]
    MissingField(&'static str),
}

/// The namespace/pod/container triple identifying the remote execution context.
///
/// All three fields are required and non-empty; a session cannot be opened
/// without a complete identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetIdentity {
    /// Kubernetes namespace.
    pub namespace: String,
    /// Pod name.
    pub pod: String,
    /// Container name within the pod.
    pub container_name: String,
}

impl TargetIdentity {
    /// Create an identity from already-validated parts.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod: pod.into(),
            container_name: container_name.into(),
        }
    }

    /// Resolve an identity from the query portion of a URL.
    ///
    /// Accepts the string with or without the leading `?`. Pairs are split on
    /// `&`, keys from values on the first `=`, and the first occurrence of a
    /// key wins. Values are passed through un-decoded.
    ///
    /// # Errors
    /// Returns `MissingField` naming the first absent (or empty) parameter.
    pub fn from_query(query: &str) -> Result<Self, IdentityError> {
        let query = query.strip_prefix('?').unwrap_or(query);

        let required = |key: &'static str| {
            query_param(query, key)
                .filter(|value| !value.is_empty())
                .ok_or(IdentityError::MissingField(key))
        };

        Ok(Self {
            namespace: required("namespace")?.to_string(),
            pod: required("pod")?.to_string(),
            container_name: required("container_name")?.to_string(),
        })
    }
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let mut pieces = pair.splitn(2, '=');
        let name = pieces.next().unwrap_or_default();
        let value = pieces.next().unwrap_or_default();
        if name == key { Some(value) } else { None }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_complete_query() {
        let identity =
            TargetIdentity::from_query("namespace=ns1&pod=pod1&container_name=c1").unwrap();
        assert_eq!(identity.namespace, "ns1");
        assert_eq!(identity.pod, "pod1");
        assert_eq!(identity.container_name, "c1");
    }

    #[test]
    fn accepts_leading_question_mark() {
        let identity =
            TargetIdentity::from_query("?namespace=a&pod=b&container_name=c").unwrap();
        assert_eq!(identity.pod, "b");
    }

    #[test]
    fn first_occurrence_wins() {
        let identity =
            TargetIdentity::from_query("namespace=first&pod=p&container_name=c&namespace=second")
                .unwrap();
        assert_eq!(identity.namespace, "first");
    }

    #[test]
    fn missing_field_is_fatal() {
        assert_eq!(
            TargetIdentity::from_query("namespace=ns1&pod=pod1"),
            Err(IdentityError::MissingField("container_name"))
        );
        assert_eq!(
            TargetIdentity::from_query("pod=pod1&container_name=c1"),
            Err(IdentityError::MissingField("namespace"))
        );
        assert_eq!(
            TargetIdentity::from_query("namespace=ns1&container_name=c1"),
            Err(IdentityError::MissingField("pod"))
        );
    }

    #[test]
    fn empty_value_counts_as_missing() {
        assert_eq!(
            TargetIdentity::from_query("namespace=&pod=p&container_name=c"),
            Err(IdentityError::MissingField("namespace"))
        );
    }

    #[test]
    fn values_are_not_decoded() {
        let identity =
            TargetIdentity::from_query("namespace=ns%2F1&pod=p&container_name=c").unwrap();
        assert_eq!(identity.namespace, "ns%2F1");
    }

    #[test]
    fn unrelated_parameters_are_ignored() {
        let identity = TargetIdentity::from_query(
            "theme=dark&namespace=ns1&pod=pod1&container_name=c1&debug=1",
        )
        .unwrap();
        assert_eq!(identity.container_name, "c1");
    }
}
