//! Front-matter parsing
//!
//! Splits a document into its `---` delimited YAML metadata block and the
//! body. The block is kept as a raw key/value mapping; typing and
//! validation happen in the schema.

use indexmap::IndexMap;
use serde_yaml::Value;

#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("front-matter block is not closed with `---`")]
    Unterminated,

    #[error("front-matter must be a mapping of keys to values")]
    NotAMapping,

    #[error("front-matter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Raw front-matter fields in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: IndexMap<String, Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// A document that does not start with a `---` line has no front-matter.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}');

        let Some(rest) = content.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };
        // `----` or `--- text` is markdown, not an opening delimiter
        let Some(rest) = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
        else {
            return Ok((FrontMatter::default(), content));
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == "---" {
                let yaml = &rest[..offset];
                let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
                return Ok((Self::from_yaml(yaml)?, body));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unterminated)
    }

    fn from_yaml(yaml: &str) -> Result<Self, FrontMatterError> {
        if yaml.trim().is_empty() {
            return Ok(FrontMatter::default());
        }

        let fields = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(map) => map
                .into_iter()
                .filter_map(|(k, v)| match k {
                    Value::String(key) => Some((key, v)),
                    _ => None,
                })
                .collect(),
            Value::Null => IndexMap::new(),
            _ => return Err(FrontMatterError::NotAMapping),
        };

        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
