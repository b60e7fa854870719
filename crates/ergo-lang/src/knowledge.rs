//! Process-wide knowledge tables: known parameters, constants, toolchains and
//! easyblocks. Built once, then shared read-only by every analysis.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{KnowledgeError, OracleError};
use crate::resolve::Constants;
use crate::value::Literal;

const BUILTIN_TABLE: &str = include_str!("../data/knowledge.toml");

/// On-disk form of the knowledge tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KnowledgeTable {
    pub default_parameters: Vec<String>,
    pub builtins: Vec<String>,
    pub constants: BTreeMap<String, toml::Value>,
    pub toolchains: BTreeMap<String, ToolchainSpec>,
    pub easyblocks: BTreeMap<String, EasyblockSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainSpec {
    pub subtoolchains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EasyblockSpec {
    pub extends: Option<String>,
    pub extra_options: Vec<String>,
}

impl KnowledgeTable {
    pub fn builtin() -> Result<Self, KnowledgeError> {
        Self::parse(BUILTIN_TABLE, "<builtin>")
    }

    pub fn parse(text: &str, origin: &str) -> Result<Self, KnowledgeError> {
        toml::from_str(text).map_err(|source| KnowledgeError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let text = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Lay `other` over `self`: name lists are unioned, keyed entries of
    /// `other` replace those of `self`.
    pub fn merge(&mut self, other: KnowledgeTable) {
        self.default_parameters.extend(other.default_parameters);
        self.builtins.extend(other.builtins);
        self.constants.extend(other.constants);
        self.toolchains.extend(other.toolchains);
        self.easyblocks.extend(other.easyblocks);
    }
}

/// Toolchain name to its direct sub-toolchains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainRegistry {
    entries: BTreeMap<String, Vec<String>>,
}

impl ToolchainRegistry {
    pub fn subtoolchains(&self, name: &str) -> &[String] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A composite toolchain is assembled from at least one sub-toolchain.
    pub fn is_composite(&self, name: &str) -> bool {
        !self.subtoolchains(name).is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<S>)> for ToolchainRegistry {
    fn from_iter<I: IntoIterator<Item = (S, Vec<S>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, subs)| (name.into(), subs.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    default_parameters: BTreeSet<String>,
    builtins: BTreeSet<String>,
    constants: Constants,
    toolchains: ToolchainRegistry,
    easyblocks: BTreeMap<String, EasyblockSpec>,
}

impl TryFrom<KnowledgeTable> for KnowledgeBase {
    type Error = KnowledgeError;

    fn try_from(table: KnowledgeTable) -> Result<Self, Self::Error> {
        let constants = table
            .constants
            .into_iter()
            .map(|(name, value)| match Literal::try_from(value) {
                Ok(literal) => Ok((name, literal)),
                Err(_) => Err(KnowledgeError::Constant { name }),
            })
            .collect::<Result<Constants, _>>()?;

        Ok(Self {
            default_parameters: table.default_parameters.into_iter().collect(),
            builtins: table.builtins.into_iter().collect(),
            constants,
            toolchains: ToolchainRegistry {
                entries: table
                    .toolchains
                    .into_iter()
                    .map(|(name, spec)| (name, spec.subtoolchains))
                    .collect(),
            },
            easyblocks: table.easyblocks,
        })
    }
}

impl KnowledgeBase {
    pub fn builtin() -> Result<Self, KnowledgeError> {
        KnowledgeTable::builtin()?.try_into()
    }

    pub fn default_parameters(&self) -> &BTreeSet<String> {
        &self.default_parameters
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn toolchains(&self) -> &ToolchainRegistry {
        &self.toolchains
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name)
    }

    pub fn is_known(&self, name: &str, extra_options: &[String]) -> bool {
        self.default_parameters.contains(name)
            || self.constants.contains_key(name)
            || extra_options.iter().any(|option| option == name)
    }

    /// Every identifier a configuration may legally use.
    pub fn known_identifiers(&self, extra_options: &[String]) -> BTreeSet<String> {
        self.default_parameters
            .iter()
            .chain(self.constants.keys())
            .chain(extra_options)
            .cloned()
            .collect()
    }

    /// Extra options of an easyblock class, inherited ones included.
    pub fn easyblock_options(&self, class: &str) -> Option<Vec<String>> {
        let mut current = self.easyblocks.get(class)?;
        let mut visited = BTreeSet::from([class]);
        let mut options = current.extra_options.clone();
        while let Some(parent) = current.extends.as_deref() {
            if !visited.insert(parent) {
                tracing::warn!(class, parent, "easyblock inheritance cycle");
                break;
            }
            let Some(spec) = self.easyblocks.get(parent) else {
                tracing::debug!(class, parent, "easyblock parent not in knowledge table");
                break;
            };
            options.extend(spec.extra_options.iter().cloned());
            current = spec;
        }
        options.sort();
        options.dedup();
        Some(options)
    }
}

/// Source of component-specific configuration keys.
pub trait KeywordOracle: Send + Sync {
    fn extra_options(
        &self,
        easyblock: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<String>, OracleError>;
}

impl KeywordOracle for KnowledgeBase {
    fn extra_options(
        &self,
        easyblock: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<String>, OracleError> {
        let class = match (easyblock, name) {
            (Some(easyblock), _) => easyblock
                .rsplit('.')
                .next()
                .unwrap_or(easyblock)
                .to_string(),
            (None, Some(name)) => encode_class_name(name),
            (None, None) => return Err(OracleError::NoCandidate),
        };
        self.easyblock_options(&class)
            .ok_or(OracleError::UnknownEasyblock(class))
    }
}

/// Class name of the software-specific easyblock for `name`, e.g.
/// `EB_Python` or `EB_libxml2` or `EB_Perl_minus_bundle`.
pub fn encode_class_name(name: &str) -> String {
    let mut out = String::from("EB_");
    for ch in name.chars() {
        let replacement = match ch {
            ' ' => "_space_",
            '!' => "_exclamation_",
            '"' => "_quotation_",
            '#' => "_hash_",
            '$' => "_dollar_",
            '%' => "_percent_",
            '&' => "_ampersand_",
            '(' => "_leftparen_",
            ')' => "_rightparen_",
            '*' => "_asterisk_",
            '+' => "_plus_",
            ',' => "_comma_",
            '-' => "_minus_",
            '.' => "_period_",
            '/' => "_slash_",
            ':' => "_colon_",
            ';' => "_semicolon_",
            '<' => "_lessthan_",
            '=' => "_equals_",
            '>' => "_greaterthan_",
            '?' => "_question_",
            '@' => "_atsign_",
            '[' => "_leftbracket_",
            '\'' => "_apostrophe_",
            '\\' => "_backslash_",
            ']' => "_rightbracket_",
            '^' => "_circumflex_",
            '_' => "_underscore_",
            '`' => "_backquote_",
            '{' => "_leftcurly_",
            '|' => "_verticalbar_",
            '}' => "_rightcurly_",
            '~' => "_tilde_",
            other => {
                out.push(other);
                continue;
            }
        };
        out.push_str(replacement);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let knowledge = KnowledgeBase::builtin().expect("builtin knowledge");
        assert!(knowledge.default_parameters().contains("homepage"));
        assert!(knowledge.is_builtin("len"));
        assert_eq!(
            knowledge.constants().get("SYSTEM").and_then(|value| value.get("name")),
            Some(&Literal::str("system"))
        );
        assert!(knowledge.toolchains().is_composite("foss"));
        assert!(!knowledge.toolchains().is_composite("GCCcore"));
    }

    #[test]
    fn easyblock_options_follow_inheritance() {
        let knowledge = KnowledgeBase::builtin().expect("builtin knowledge");
        let options = knowledge.easyblock_options("CMakeMake").expect("CMakeMake");
        assert!(options.iter().any(|option| option == "separate_build_dir"));
        assert!(options.iter().any(|option| option == "configure_cmd_prefix"));
    }

    #[test]
    fn easyblock_cycles_terminate() {
        let table = KnowledgeTable::parse(
            r#"
[easyblocks.A]
extends = "B"
extra_options = ["a"]

[easyblocks.B]
extends = "A"
extra_options = ["b"]
"#,
            "cycle.toml",
        )
        .expect("parse");
        let knowledge = KnowledgeBase::try_from(table).expect("knowledge");
        assert_eq!(
            knowledge.easyblock_options("A"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn oracle_derives_software_specific_class() {
        let knowledge = KnowledgeBase::builtin().expect("builtin knowledge");
        assert!(knowledge.extra_options(None, Some("GCC")).is_ok());
        assert_eq!(
            knowledge.extra_options(None, Some("no-such")),
            Err(OracleError::UnknownEasyblock("EB_no_minus_such".to_string()))
        );
        assert_eq!(knowledge.extra_options(None, None), Err(OracleError::NoCandidate));
        let qualified = knowledge
            .extra_options(Some("easybuild.easyblocks.generic.tarball.Tarball"), None)
            .expect("tarball");
        assert!(qualified.iter().any(|option| option == "install_type"));
    }

    #[test]
    fn user_table_overrides_per_key() {
        let mut table = KnowledgeTable::builtin().expect("builtin");
        table.merge(
            KnowledgeTable::parse(
                "default_parameters = ['site_option']\n[toolchains.GCCcore]\nsubtoolchains = ['system']\n",
                "user.toml",
            )
            .expect("user"),
        );
        let knowledge = KnowledgeBase::try_from(table).expect("knowledge");
        assert!(knowledge.default_parameters().contains("site_option"));
        assert!(knowledge.default_parameters().contains("homepage"));
        assert_eq!(knowledge.toolchains().subtoolchains("GCCcore"), ["system"]);
    }

    #[test]
    fn class_name_encoding() {
        assert_eq!(encode_class_name("Perl-bundle"), "EB_Perl_minus_bundle");
        assert_eq!(encode_class_name("g++"), "EB_g_plus__plus_");
        assert_eq!(encode_class_name("libxml2"), "EB_libxml2");
    }
}
