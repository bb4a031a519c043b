//! Name Rewriting
//!
//! Maps schema names onto Jsonnet identifiers:
//! - Kind names become object keys (`APIService` -> `apiService`)
//! - Field names become function identifiers, parameter names and field keys
//! - Per-release rewrite tables fix casing (`externalIPs` -> `externalIps`)
//!
//! The policy is a trait so callers can supply their own rules. It must be
//! referentially stable: the same input always yields the same output.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::NamingConfig;

/// Jsonnet reserved words
const JSONNET_KEYWORDS: &[&str] = &[
    "assert", "else", "error", "false", "for", "function", "if", "import", "importstr",
    "in", "local", "null", "self", "super", "tailstrict", "then", "true",
];

/// Release key whose rewrites apply to every release
pub const ANY_RELEASE: &str = "*";

// =============================================================================
// Naming Policy
// =============================================================================

/// Identifier rewriting rules used by the importer and the emitter
pub trait NamingPolicy {
    /// Rewrite a raw field or kind name into an output identifier
    fn rewrite_identifier(&self, release: &str, raw: &str) -> String;

    /// Object key for a kind (`PodSpec` -> `podSpec`)
    fn object_identifier(&self, release: &str, kind: &str) -> String;

    /// Key used when assigning the raw field inside a generated object literal
    fn field_key(&self, raw: &str) -> String;

    /// Parameter name for setters taking the raw field
    fn param_name(&self, raw: &str) -> String;

    /// Suffix appended to a rewritten identifier to form a type alias name
    fn type_alias_suffix(&self) -> &str;

    /// Setter function name for an identifier
    fn setter_id(&self, identifier: &str) -> String {
        format!("with{}", capitalize(identifier))
    }

    /// Mixin setter function name for an identifier
    fn mixin_id(&self, identifier: &str) -> String {
        format!("{}Mixin", self.setter_id(identifier))
    }

    /// Type alias name for a raw field, derived from its rewritten identifier
    fn type_alias_id(&self, release: &str, raw: &str) -> String {
        format!("{}{}", self.rewrite_identifier(release, raw), self.type_alias_suffix())
    }
}

// =============================================================================
// Default Policy
// =============================================================================

/// Default Jsonnet naming policy driven by [`NamingConfig`]
#[derive(Debug, Clone, Default)]
pub struct JsonnetNaming {
    config: NamingConfig,
}

impl JsonnetNaming {
    pub fn new(mut config: NamingConfig) -> Self {
        config.acronyms.retain(|a| !a.is_empty());
        Self { config }
    }

    fn rewrite_table(&self, release: &str) -> impl Iterator<Item = &BTreeMap<String, String>> {
        self.config
            .rewrites
            .get(release)
            .into_iter()
            .chain(self.config.rewrites.get(ANY_RELEASE))
    }

    fn lookup_rewrite(&self, release: &str, raw: &str) -> Option<&str> {
        self.rewrite_table(release)
            .find_map(|table| table.get(raw))
            .map(String::as_str)
    }

    /// Fold known acronyms inside a camelCase identifier (`podIP` -> `podIp`)
    fn fold_acronyms(&self, identifier: &str) -> String {
        fold_acronyms(identifier, &self.config.acronyms)
    }
}

impl NamingPolicy for JsonnetNaming {
    fn rewrite_identifier(&self, release: &str, raw: &str) -> String {
        if let Some(rewritten) = self.lookup_rewrite(release, raw) {
            return rewritten.to_string();
        }
        let identifier = to_identifier(raw);
        if self.config.fold_acronyms {
            self.fold_acronyms(&identifier)
        } else {
            identifier
        }
    }

    fn object_identifier(&self, release: &str, kind: &str) -> String {
        if let Some(rewritten) = self.lookup_rewrite(release, kind) {
            return rewritten.to_string();
        }
        lower_leading_capitals(&to_identifier(kind))
    }

    fn field_key(&self, raw: &str) -> String {
        if is_identifier(raw) && !is_keyword(raw) {
            raw.to_string()
        } else {
            serde_json::Value::String(raw.to_string()).to_string()
        }
    }

    fn param_name(&self, raw: &str) -> String {
        let identifier = to_identifier(raw);
        if is_keyword(&identifier) {
            format!("{}Param", identifier)
        } else {
            identifier
        }
    }

    fn type_alias_suffix(&self) -> &str {
        &self.config.type_alias_suffix
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub fn is_keyword(s: &str) -> bool {
    JSONNET_KEYWORDS.contains(&s)
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Render a key for use on the left of `::`, quoting it when it is not a
/// bare identifier
pub fn object_key(identifier: &str) -> String {
    if is_identifier(identifier) && !is_keyword(identifier) {
        identifier.to_string()
    } else {
        serde_json::Value::String(identifier.to_string()).to_string()
    }
}

/// Upper-case the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Strip characters Jsonnet identifiers can't hold, camel-casing across them
/// (`x-kubernetes-int-or-string` -> `xKubernetesIntOrString`, `$ref` -> `ref`)
fn to_identifier(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut capitalize_next = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if capitalize_next && !result.is_empty() {
                result.push(c.to_ascii_uppercase());
            } else {
                result.push(c);
            }
            capitalize_next = false;
        } else {
            capitalize_next = true;
        }
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

/// Lower-case a leading run of capitals, keeping the capital that starts
/// the next word (`APIService` -> `apiService`, `Pod` -> `pod`)
fn lower_leading_capitals(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let leading = chars.iter().take_while(|c| c.is_ascii_uppercase()).count();

    let lower_count = match leading {
        0 => 0,
        n if n == chars.len() => n,
        1 => 1,
        n if chars[n].is_ascii_lowercase() => n - 1,
        n => n,
    };

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < lower_count { c.to_ascii_lowercase() } else { *c })
        .collect()
}

fn fold_acronyms(identifier: &str, acronyms: &BTreeSet<String>) -> String {
    let mut result = String::with_capacity(identifier.len());
    let mut rest = identifier;

    while !rest.is_empty() {
        let run: String = rest
            .chars()
            .take_while(|c| c.is_ascii_uppercase())
            .collect();
        let matched = acronyms
            .iter()
            .filter(|a| !a.is_empty() && run.starts_with(a.as_str()))
            .max_by_key(|a| a.len());

        match matched {
            Some(acronym) if !result.is_empty() => {
                let mut chars = acronym.chars();
                if let Some(first) = chars.next() {
                    result.push(first);
                    result.extend(chars.map(|c| c.to_ascii_lowercase()));
                }
                rest = &rest[acronym.len()..];
            }
            _ => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    result.push(c);
                }
                rest = chars.as_str();
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn naming() -> JsonnetNaming {
        JsonnetNaming::default()
    }

    #[rstest]
    #[case("Pod", "pod")]
    #[case("PodSpec", "podSpec")]
    #[case("APIService", "apiService")]
    #[case("HTTPGetAction", "httpGetAction")]
    #[case("URL", "url")]
    fn test_object_identifier(#[case] kind: &str, #[case] expected: &str) {
        assert_eq!(naming().object_identifier("v1.8.0", kind), expected);
    }

    #[rstest]
    #[case("x-kubernetes-int-or-string", "xKubernetesIntOrString")]
    #[case("$ref", "ref")]
    #[case("containers", "containers")]
    #[case("3d", "_3d")]
    fn test_rewrite_identifier(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(naming().rewrite_identifier("v1.8.0", raw), expected);
    }

    #[test]
    fn test_field_key_quotes_invalid_names() {
        let n = naming();
        assert_eq!(n.field_key("image"), "image");
        assert_eq!(n.field_key("$ref"), "\"$ref\"");
        assert_eq!(n.field_key("local"), "\"local\"");
    }

    #[test]
    fn test_param_name_avoids_keywords() {
        let n = naming();
        assert_eq!(n.param_name("local"), "localParam");
        assert_eq!(n.param_name("$schema"), "schema");
    }

    #[test]
    fn test_setter_and_mixin_ids() {
        let n = naming();
        assert_eq!(n.setter_id("imagePullSecrets"), "withImagePullSecrets");
        assert_eq!(n.mixin_id("labels"), "withLabelsMixin");
        assert_eq!(n.type_alias_id("v1.8.0", "containers"), "containersType");
    }

    #[test]
    fn test_release_rewrites_apply_to_aliases() {
        let mut config = NamingConfig::default();
        config
            .rewrites
            .entry("v1.8.0".to_string())
            .or_default()
            .insert("externalIPs".to_string(), "externalIps".to_string());
        let n = JsonnetNaming::new(config);

        assert_eq!(n.rewrite_identifier("v1.8.0", "externalIPs"), "externalIps");
        assert_eq!(n.type_alias_id("v1.8.0", "externalIPs"), "externalIpsType");
        assert_eq!(n.rewrite_identifier("v1.9.0", "externalIPs"), "externalIPs");
    }

    #[test]
    fn test_wildcard_rewrites() {
        let mut config = NamingConfig::default();
        config
            .rewrites
            .entry(ANY_RELEASE.to_string())
            .or_default()
            .insert("hostIPC".to_string(), "hostIpc".to_string());
        let n = JsonnetNaming::new(config);
        assert_eq!(n.rewrite_identifier("v1.7.0", "hostIPC"), "hostIpc");
    }

    #[test]
    fn test_acronym_folding() {
        let config = NamingConfig {
            fold_acronyms: true,
            ..NamingConfig::default()
        };
        let n = JsonnetNaming::new(config);
        assert_eq!(n.rewrite_identifier("v1.8.0", "podIP"), "podIp");
        assert_eq!(n.rewrite_identifier("v1.8.0", "externalIPs"), "externalIps");
        assert_eq!(n.rewrite_identifier("v1.8.0", "targetURL"), "targetUrl");
        assert_eq!(n.rewrite_identifier("v1.8.0", "name"), "name");
    }

    #[test]
    fn test_empty_acronym_is_ignored() {
        let mut config = NamingConfig {
            fold_acronyms: true,
            ..NamingConfig::default()
        };
        config.acronyms.insert(String::new());
        let n = JsonnetNaming::new(config.clone());
        assert_eq!(n.rewrite_identifier("v1.8.0", "podIP"), "podIp");
        assert_eq!(fold_acronyms("targetURL", &config.acronyms), "targetUrl");
        assert_eq!(fold_acronyms("name", &config.acronyms), "name");
    }

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("metadata"), "metadata");
        assert_eq!(object_key("default"), "default");
        assert_eq!(object_key("error"), "\"error\"");
    }
}
