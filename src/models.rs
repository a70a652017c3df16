use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::Deserialize;

use crate::error::Error;

/// Namespaces owned by the platform; their pods are never "application" pods.
pub const SYSTEM_NAMESPACES: [&str; 4] = ["kube-system", "kube-public", "kube-node-lease", "gke-system"];

pub fn is_system_namespace(namespace: &str) -> bool {
    SYSTEM_NAMESPACES.contains(&namespace)
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Project {
    #[serde(rename = "projectId")]
    pub project_id: String,
    #[serde(default)]
    pub name: String,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.project_id, self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectStatus {
    NotAccessible,
    HasClusters,
    Accessible,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProjectStatus::NotAccessible => "✗ Not accessible",
            ProjectStatus::HasClusters => "✓ Connected (has clusters)",
            ProjectStatus::Accessible => "✓ Accessible",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
    pub location: String,
}

impl Cluster {
    /// Whether a kubectl context name points at this cluster.
    pub fn is_active_in(&self, context: &str) -> bool {
        match GkeContext::parse(context) {
            Some(gke) => gke.cluster == self.name && gke.location == self.location,
            None => !context.is_empty() && context.contains(&self.name),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.location)
    }
}

/// A kubectl context written by `gcloud container clusters get-credentials`,
/// named `gke_<project>_<location>_<cluster>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GkeContext {
    pub project: String,
    pub location: String,
    pub cluster: String,
}

impl GkeContext {
    pub fn parse(context: &str) -> Option<Self> {
        let mut parts = context.trim().strip_prefix("gke_")?.splitn(3, '_');
        let project = parts.next().filter(|s| !s.is_empty())?;
        let location = parts.next().filter(|s| !s.is_empty())?;
        let cluster = parts.next().filter(|s| !s.is_empty())?;
        Some(Self {
            project: project.to_string(),
            location: location.to_string(),
            cluster: cluster.to_string(),
        })
    }
}

/// A pod addressed as `namespace/name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for PodRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            [namespace, name] => Ok(Self {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            _ => Err(Error::InvalidPodRef(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodInfo {
    pub namespace: String,
    pub name: String,
    pub status: String,
    pub ready: String,
    pub restarts: String,
    pub age: String,
    pub node: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Picks the level from the mutually exclusive CLI flags; the most severe wins.
    pub fn from_flags(error: bool, warn: bool, info: bool, debug: bool) -> Option<Self> {
        if error {
            Some(LogLevel::Error)
        } else if warn {
            Some(LogLevel::Warn)
        } else if info {
            Some(LogLevel::Info)
        } else if debug {
            Some(LogLevel::Debug)
        } else {
            None
        }
    }

    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            LogLevel::Error => &["ERROR", "FATAL", "Exception", "Error"],
            LogLevel::Warn => &["WARN", "WARNING"],
            LogLevel::Info => &["INFO"],
            LogLevel::Debug => &["DEBUG"],
        }
    }

    /// Case-insensitive matcher for any of this level's patterns.
    pub fn matcher(self) -> Result<Regex, regex::Error> {
        let alternation = self
            .patterns()
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i){alternation}"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_namespaces() {
        assert!(is_system_namespace("kube-system"));
        assert!(is_system_namespace("gke-system"));
        assert!(!is_system_namespace("default"));
        assert!(!is_system_namespace("kube-systemx"));
    }

    #[test]
    fn gke_context_parses_all_parts() {
        let ctx = GkeContext::parse("gke_acme-prod_us-central1-a_web-cluster").unwrap();
        assert_eq!(ctx.project, "acme-prod");
        assert_eq!(ctx.location, "us-central1-a");
        assert_eq!(ctx.cluster, "web-cluster");
    }

    #[test]
    fn non_gke_contexts_are_rejected() {
        assert_eq!(GkeContext::parse("minikube"), None);
        assert_eq!(GkeContext::parse("gke_only-project"), None);
        assert_eq!(GkeContext::parse("gke_p__c"), None);
        assert_eq!(GkeContext::parse(""), None);
    }

    #[test]
    fn cluster_activity_prefers_gke_context() {
        let cluster = Cluster {
            name: "web".into(),
            location: "europe-west1".into(),
        };
        assert!(cluster.is_active_in("gke_acme_europe-west1_web"));
        assert!(!cluster.is_active_in("gke_acme_us-east1_web"));
        assert!(!cluster.is_active_in("gke_acme_europe-west1_web-staging"));
        assert!(cluster.is_active_in("my-web-alias"));
        assert!(!cluster.is_active_in(""));
    }

    #[test]
    fn pod_ref_round_trips_through_display() {
        let pod: PodRef = "payments/api-7d9f-x2".parse().unwrap();
        assert_eq!(pod.namespace, "payments");
        assert_eq!(pod.name, "api-7d9f-x2");
        assert_eq!(pod.to_string(), "payments/api-7d9f-x2");
    }

    #[test]
    fn pod_ref_requires_exactly_two_parts() {
        assert!(matches!("api".parse::<PodRef>(), Err(Error::InvalidPodRef(_))));
        assert!(matches!("a/b/c".parse::<PodRef>(), Err(Error::InvalidPodRef(_))));
    }

    #[test]
    fn level_flags_prefer_most_severe() {
        assert_eq!(LogLevel::from_flags(false, false, false, false), None);
        assert_eq!(LogLevel::from_flags(false, true, true, true), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_flags(true, true, false, false), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_flags(false, false, false, true), Some(LogLevel::Debug));
    }

    #[test]
    fn level_matchers_are_case_insensitive() {
        let error = LogLevel::Error.matcher().unwrap();
        assert!(error.is_match("2024-01-01 error: connection refused"));
        assert!(error.is_match("NoMethodError raised"));
        assert!(error.is_match("java.lang.NullPointerException"));
        assert!(!error.is_match("INFO request completed"));

        let warn = LogLevel::Warn.matcher().unwrap();
        assert!(warn.is_match("Warning: disk almost full"));
        assert!(!warn.is_match("DEBUG cache hit"));
    }

    #[test]
    fn project_status_labels() {
        assert_eq!(ProjectStatus::HasClusters.to_string(), "✓ Connected (has clusters)");
        assert_eq!(ProjectStatus::NotAccessible.to_string(), "✗ Not accessible");
    }
}
