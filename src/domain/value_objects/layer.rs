//! Configuration layers
//!
//! A layer is one configuration source (personal, project, or a named team)
//! with a defined override priority: lower priority layers form the base,
//! higher priority layers overlay them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::names::validate_team_name;
use crate::error::NixlayerResult;

/// The `type` field of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Team,
    #[serde(alias = "user")]
    Personal,
    Project,
}

impl LayerKind {
    /// Priority used when a document does not set `metadata.priority`.
    pub fn default_priority(self) -> i32 {
        match self {
            LayerKind::Team => 10,
            LayerKind::Personal => 20,
            LayerKind::Project => 30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Team => "team",
            LayerKind::Personal => "personal",
            LayerKind::Project => "project",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addresses one config document in the state directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Personal,
    Project,
    Team(String),
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Personal => LayerKind::Personal,
            Layer::Project => LayerKind::Project,
            Layer::Team(_) => LayerKind::Team,
        }
    }

    /// Resolve a `base:` reference. `personal` and `project` name those
    /// layers; anything else names a team config and must be a plain name.
    pub fn from_reference(reference: &str) -> NixlayerResult<Self> {
        match reference.trim() {
            "personal" | "user" => Ok(Layer::Personal),
            "project" => Ok(Layer::Project),
            other => {
                validate_team_name(other)?;
                Ok(Layer::Team(other.to_string()))
            }
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Personal => f.write_str("personal"),
            Layer::Project => f.write_str("project"),
            Layer::Team(name) => write!(f, "team:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priorities_put_project_on_top() {
        assert!(LayerKind::Team.default_priority() < LayerKind::Personal.default_priority());
        assert!(LayerKind::Personal.default_priority() < LayerKind::Project.default_priority());
    }

    #[test]
    fn user_is_an_alias_for_personal() {
        let kind: LayerKind = serde_yaml_ng::from_str("user").unwrap();
        assert_eq!(kind, LayerKind::Personal);

        let kind: LayerKind = serde_yaml_ng::from_str("personal").unwrap();
        assert_eq!(kind, LayerKind::Personal);
        assert_eq!(serde_yaml_ng::to_string(&kind).unwrap().trim(), "personal");
    }

    #[test]
    fn base_references_resolve_to_layers() {
        assert_eq!(Layer::from_reference("personal").unwrap(), Layer::Personal);
        assert_eq!(Layer::from_reference("project").unwrap(), Layer::Project);
        assert_eq!(
            Layer::from_reference("platform").unwrap(),
            Layer::Team("platform".to_string())
        );
    }

    #[test]
    fn team_references_cannot_leave_teams_dir() {
        assert!(Layer::from_reference("../personal").is_err());
        assert!(Layer::from_reference("nested/team").is_err());
    }

    #[test]
    fn display_names() {
        assert_eq!(Layer::Team("infra".into()).to_string(), "team:infra");
        assert_eq!(Layer::Personal.kind().to_string(), "personal");
    }
}
