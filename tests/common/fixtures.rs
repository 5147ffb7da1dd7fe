//! Config documents shared by integration tests.

pub const PERSONAL_ZSH: &str = r#"version: "1.0"
kind: EnvironmentConfig
type: personal
metadata:
  name: tester
settings:
  shell:
    type: zsh
packages:
  core: [git, ripgrep]
"#;

pub const PERSONAL_BASH: &str = r#"version: "1.0"
kind: EnvironmentConfig
type: personal
metadata:
  name: tester
settings:
  shell:
    type: bash
packages:
  core: [git]
"#;

pub const PROJECT_BASH: &str = r#"version: "1.0"
kind: EnvironmentConfig
type: project
metadata:
  name: webapp
settings:
  shell:
    type: bash
packages:
  core: [nodejs, git]
"#;

pub const TEAM_BACKEND: &str = r#"version: "1.0"
kind: EnvironmentConfig
type: team
metadata:
  name: backend
packages:
  core: [terraform]
"#;
