//! Shell and editor allow-lists
//!
//! Config documents carry shell and editor names as free text; these types
//! normalize them case-insensitively (resolving aliases) onto a fixed
//! allow-list.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
    Nushell,
}

impl ShellKind {
    pub const ALL: [ShellKind; 4] = [
        ShellKind::Bash,
        ShellKind::Zsh,
        ShellKind::Fish,
        ShellKind::Nushell,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "bash" => Some(ShellKind::Bash),
            "zsh" => Some(ShellKind::Zsh),
            "fish" => Some(ShellKind::Fish),
            "nushell" | "nu" => Some(ShellKind::Nushell),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
            ShellKind::Nushell => "nushell",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorKind {
    Vim,
    Neovim,
    Emacs,
    VsCode,
    Helix,
    Nano,
}

impl EditorKind {
    pub const ALL: [EditorKind; 6] = [
        EditorKind::Vim,
        EditorKind::Neovim,
        EditorKind::Emacs,
        EditorKind::VsCode,
        EditorKind::Helix,
        EditorKind::Nano,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "vim" | "vi" => Some(EditorKind::Vim),
            "neovim" | "nvim" => Some(EditorKind::Neovim),
            "emacs" => Some(EditorKind::Emacs),
            "vscode" | "vs-code" | "code" => Some(EditorKind::VsCode),
            "helix" | "hx" => Some(EditorKind::Helix),
            "nano" => Some(EditorKind::Nano),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EditorKind::Vim => "vim",
            EditorKind::Neovim => "neovim",
            EditorKind::Emacs => "emacs",
            EditorKind::VsCode => "vscode",
            EditorKind::Helix => "helix",
            EditorKind::Nano => "nano",
        }
    }
}

impl fmt::Display for EditorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma-separated canonical names, for error messages.
pub fn allowed_names<T: fmt::Display>(kinds: &[T]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_parse_is_case_insensitive() {
        assert_eq!(ShellKind::parse("ZSH"), Some(ShellKind::Zsh));
        assert_eq!(ShellKind::parse(" Bash "), Some(ShellKind::Bash));
        assert_eq!(ShellKind::parse("nu"), Some(ShellKind::Nushell));
        assert_eq!(ShellKind::parse("tcsh"), None);
    }

    #[test]
    fn editor_aliases_resolve_to_canonical_names() {
        assert_eq!(EditorKind::parse("nvim"), Some(EditorKind::Neovim));
        assert_eq!(EditorKind::parse("Code"), Some(EditorKind::VsCode));
        assert_eq!(EditorKind::parse("hx").map(|e| e.as_str()), Some("helix"));
        assert_eq!(EditorKind::parse("notepad"), None);
    }

    #[test]
    fn canonical_names_parse_to_themselves() {
        for shell in ShellKind::ALL {
            assert_eq!(ShellKind::parse(shell.as_str()), Some(shell));
        }
        for editor in EditorKind::ALL {
            assert_eq!(EditorKind::parse(editor.as_str()), Some(editor));
        }
    }

    #[test]
    fn allowed_names_lists_everything() {
        assert_eq!(allowed_names(&ShellKind::ALL), "bash, zsh, fish, nushell");
    }
}
