//! Environment entity
//!
//! An environment is a named directory of generated artifacts. The template
//! text is opaque to nixlayer; only `{{ key }}` placeholders are substituted.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::entities::Config;
use crate::domain::value_objects::EnvironmentName;

/// Primary manifest written into every environment.
pub const PRIMARY_MANIFEST: &str = "flake.nix";
/// Home/user manifest written into every environment.
pub const HOME_MANIFEST: &str = "home.nix";
/// Optional user customization file.
pub const CUSTOM_FILE: &str = "custom.nix";

/// Artifacts that must exist for an environment to be switchable.
pub const REQUIRED_ARTIFACTS: [&str; 2] = [PRIMARY_MANIFEST, HOME_MANIFEST];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: EnvironmentName,
    pub path: PathBuf,
    pub is_current: bool,
}

/// Unrendered manifests for a new environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentTemplate {
    pub primary: String,
    pub home: String,
    pub custom: Option<String>,
}

impl Default for EnvironmentTemplate {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.to_string(),
            home: DEFAULT_HOME.to_string(),
            custom: Some(DEFAULT_CUSTOM.to_string()),
        }
    }
}

/// Template variables derived from an environment name and its effective config.
pub type TemplateVars = BTreeMap<String, String>;

pub fn template_vars(name: &EnvironmentName, config: &Config) -> TemplateVars {
    let system = nix_system();

    let mut vars = TemplateVars::new();
    vars.insert("name".into(), name.to_string());
    vars.insert(
        "description".into(),
        if config.metadata.description.is_empty() {
            format!("nixlayer environment {name}")
        } else {
            config.metadata.description.clone()
        },
    );
    vars.insert("system".into(), system);
    vars.insert(
        "shell".into(),
        config.shell_type().unwrap_or("bash").to_string(),
    );
    vars.insert(
        "editor".into(),
        config.editor_type().unwrap_or("nano").to_string(),
    );
    vars.insert(
        "packages".into(),
        config.packages.flattened(host_platform()).join(" "),
    );
    vars.insert(
        "session_variables".into(),
        config
            .settings
            .environment
            .iter()
            .map(|(k, v)| format!("{k} = \"{v}\";"))
            .collect::<Vec<_>>()
            .join(" "),
    );
    vars
}

/// Nix system double for the running host (`x86_64-linux`, `aarch64-darwin`, ...).
pub fn nix_system() -> String {
    format!("{}-{}", std::env::consts::ARCH, host_platform())
}

/// Key of `packages.platform` that applies to the running host.
pub fn host_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

const DEFAULT_PRIMARY: &str = r#"{
  description = "{{description}}";

  inputs = {
    nixpkgs.url = "github:NixOS/nixpkgs/nixos-unstable";
    home-manager = {
      url = "github:nix-community/home-manager";
      inputs.nixpkgs.follows = "nixpkgs";
    };
  };

  outputs = { nixpkgs, home-manager, ... }: {
    homeConfigurations."{{name}}" = home-manager.lib.homeManagerConfiguration {
      pkgs = nixpkgs.legacyPackages."{{system}}";
      modules = [ ./home.nix ./custom.nix ];
    };
  };
}
"#;

const DEFAULT_HOME: &str = r#"{ pkgs, ... }:

{
  home.packages = with pkgs; [ {{packages}} ];
  home.sessionVariables = { EDITOR = "{{editor}}"; {{session_variables}} };
  programs.{{shell}}.enable = true;
}
"#;

const DEFAULT_CUSTOM: &str = r#"# Local overrides for {{name}}. nixlayer never regenerates this file.
{ ... }:

{
}
"#;
