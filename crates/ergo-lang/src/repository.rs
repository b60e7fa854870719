//! Lookup of easyconfig files in robot-path repositories.
//!
//! Each root follows the easyconfigs repository layout
//! `<root>/<first letter>/<name>/<name>-<version>[-<toolchain>]<suffix>.eb`;
//! a flat `<root>/<file>.eb` layout is searched as well.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::toolchain::ToolchainRef;

pub const DEFAULT_MAX_MATCHES: usize = 500;

pub trait ArtifactLocator: Send + Sync {
    /// File names of every configuration for `name` with `versionsuffix`
    /// built with one of `toolchains`, any version.
    fn find_config_files(&self, name: &str, versionsuffix: &str, toolchains: &[ToolchainRef]) -> Vec<String>;

    /// Whether any configuration for `name` exists at all.
    fn name_exists(&self, name: &str) -> bool;

    /// Known package names that are candidates for correcting `name`.
    fn suggest_names(&self, name: &str) -> Vec<String>;

    /// Source of the configuration defining `toolchain` itself.
    fn toolchain_config(&self, toolchain: &ToolchainRef) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct FsRepository {
    roots: Vec<PathBuf>,
    max_matches: usize,
}

impl FsRepository {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }

    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = max_matches.max(1);
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let paths = match glob::glob_with(pattern, options) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::warn!(pattern, %err, "invalid repository pattern");
                return Vec::new();
            }
        };
        let mut out = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => out.push(path),
                Err(err) => tracing::warn!(pattern, %err, "repository entry is unreadable"),
            }
            if out.len() >= self.max_matches {
                tracing::debug!(pattern, limit = self.max_matches, "repository scan truncated");
                break;
            }
        }
        out
    }

    /// `<root>/<letter>/<name>` and `<root>`, both escaped for globbing.
    fn search_dirs(&self, root: &Path, name: &str) -> Option<[String; 2]> {
        let letter = name.chars().next()?.to_lowercase().to_string();
        let root = Pattern::escape(&root.to_string_lossy());
        let nested = format!("{root}/{}/{}", Pattern::escape(&letter), Pattern::escape(name));
        Some([nested, root])
    }
}

impl ArtifactLocator for FsRepository {
    fn find_config_files(&self, name: &str, versionsuffix: &str, toolchains: &[ToolchainRef]) -> Vec<String> {
        let escaped_name = Pattern::escape(name);
        let suffix = Pattern::escape(versionsuffix);
        let mut seen = BTreeSet::new();
        let mut found = Vec::new();

        for root in &self.roots {
            let Some(dirs) = self.search_dirs(root, name) else {
                continue;
            };
            for toolchain in toolchains {
                let file = if toolchain.is_system() {
                    format!("{escaped_name}-*{suffix}.eb")
                } else {
                    format!(
                        "{escaped_name}-*-{}-{}{suffix}.eb",
                        Pattern::escape(&toolchain.name),
                        Pattern::escape(&toolchain.version)
                    )
                };
                for dir in &dirs {
                    for path in self.glob(&format!("{dir}/{file}")) {
                        let Some(file_name) = path.file_name().map(|name| name.to_string_lossy().into_owned())
                        else {
                            continue;
                        };
                        if seen.insert(file_name.clone()) {
                            found.push(file_name);
                        }
                        if found.len() >= self.max_matches {
                            return found;
                        }
                    }
                }
            }
        }
        found
    }

    fn name_exists(&self, name: &str) -> bool {
        self.roots.iter().any(|root| {
            let Some(letter) = name.chars().next().map(|ch| ch.to_lowercase().to_string()) else {
                return false;
            };
            root.join(letter).join(name).is_dir()
                || !self
                    .glob(&format!(
                        "{}/{}-*.eb",
                        Pattern::escape(&root.to_string_lossy()),
                        Pattern::escape(name)
                    ))
                    .is_empty()
        })
    }

    fn suggest_names(&self, name: &str) -> Vec<String> {
        let Some(letter) = name.chars().next().map(|ch| ch.to_lowercase().to_string()) else {
            return Vec::new();
        };
        let mut names = BTreeSet::new();
        for root in &self.roots {
            let pattern = format!(
                "{}/{}/*",
                Pattern::escape(&root.to_string_lossy()),
                Pattern::escape(&letter)
            );
            names.extend(
                self.glob(&pattern)
                    .into_iter()
                    .filter(|path| path.is_dir())
                    .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned())),
            );
        }
        names.into_iter().collect()
    }

    fn toolchain_config(&self, toolchain: &ToolchainRef) -> Option<String> {
        let file = format!(
            "{}-{}.eb",
            Pattern::escape(&toolchain.name),
            Pattern::escape(&toolchain.version)
        );
        let path = self.roots.iter().find_map(|root| {
            let dirs = self.search_dirs(root, &toolchain.name)?;
            dirs.iter()
                .find_map(|dir| self.glob(&format!("{dir}/{file}")).into_iter().next())
        })?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read toolchain definition");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("ergo_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).expect("create fixture root");
        root
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture parent");
        }
        std::fs::write(path, "").expect("write fixture");
    }

    #[test]
    fn finds_nested_and_flat_layouts() {
        let root = fixture_root("repository_layouts");
        touch(&root, "z/zlib/zlib-1.2.13-GCCcore-12.3.0.eb");
        touch(&root, "zlib-1.2.11-GCCcore-12.3.0.eb");
        touch(&root, "z/zlib/zlib-1.2.13.eb");
        let repository = FsRepository::new(vec![root]);

        let mut found = repository.find_config_files("zlib", "", &[ToolchainRef::new("GCCcore", "12.3.0")]);
        found.sort();
        assert_eq!(
            found,
            vec!["zlib-1.2.11-GCCcore-12.3.0.eb", "zlib-1.2.13-GCCcore-12.3.0.eb"]
        );

        let mut any_toolchain = repository.find_config_files("zlib", "", &[ToolchainRef::system()]);
        any_toolchain.sort();
        assert_eq!(
            any_toolchain,
            vec![
                "zlib-1.2.11-GCCcore-12.3.0.eb",
                "zlib-1.2.13-GCCcore-12.3.0.eb",
                "zlib-1.2.13.eb"
            ]
        );
        assert!(
            repository
                .find_config_files("zlib", "-static", &[ToolchainRef::system()])
                .is_empty()
        );
    }

    #[test]
    fn name_lookup_and_suggestions() {
        let root = fixture_root("repository_names");
        touch(&root, "h/HDF5/HDF5-1.14.0-gompi-2023a.eb");
        touch(&root, "h/HDF/HDF-4.2.16-GCCcore-12.3.0.eb");
        touch(&root, "Flat-1.0.eb");
        let repository = FsRepository::new(vec![root]);

        assert!(repository.name_exists("HDF5"));
        assert!(repository.name_exists("Flat"));
        assert!(!repository.name_exists("HDF6"));
        assert_eq!(repository.suggest_names("HDF6"), vec!["HDF", "HDF5"]);
    }

    #[test]
    fn missing_roots_yield_nothing() {
        let repository = FsRepository::new(vec![PathBuf::from("/nonexistent/easyconfigs")]);
        assert!(repository.find_config_files("zlib", "", &[ToolchainRef::system()]).is_empty());
        assert!(!repository.name_exists("zlib"));
        assert!(repository.suggest_names("zlib").is_empty());
        assert!(repository.toolchain_config(&ToolchainRef::new("foss", "2023a")).is_none());
    }

    #[test]
    fn reads_toolchain_definition() {
        let root = fixture_root("repository_toolchain");
        let path = root.join("f/foss/foss-2023a.eb");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "name = 'foss'\n").expect("write");
        let repository = FsRepository::new(vec![root]);
        assert_eq!(
            repository.toolchain_config(&ToolchainRef::new("foss", "2023a")).as_deref(),
            Some("name = 'foss'\n")
        );
    }
}
