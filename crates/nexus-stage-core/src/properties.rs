use std::collections::BTreeMap;
use std::path::Path;

/// Ambient build properties (`KEY=value` lines), e.g. a `gradle.properties`
/// style file holding `nexusUsername` / `nexusPassword`.
///
/// Lookups fall back to process environment variables when a key is not
/// present in the file.
#[derive(Debug, Clone, Default)]
pub struct BuildProperties {
    values: BTreeMap<String, String>,
}

impl BuildProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load properties from a file. A missing file yields an empty set.
    pub fn load(path: &Path) -> miette::Result<Self> {
        let mut values = BTreeMap::new();
        if !path.is_file() {
            return Ok(Self { values });
        }
        let content = std::fs::read_to_string(path)
            .map_err(nexus_stage_util::errors::StagingError::Io)?;
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = trimmed.split_once('=') {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Ok(Self { values })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a property, then the process environment.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
    }

    /// Interpolate `${env:VAR}` references in a string.
    ///
    /// Unknown keys expand to the empty string; an unterminated reference is
    /// left as-is.
    pub fn interpolate(&self, input: &str) -> String {
        let mut result = input.to_string();
        let mut from = 0;
        while let Some(offset) = result[from..].find("${env:") {
            let start = from + offset;
            let Some(end) = result[start..].find('}') else {
                break;
            };
            let end = start + end;
            let key = &result[start + 6..end];
            let value = self.get(key).unwrap_or_default();
            result.replace_range(start..=end, &value);
            from = start + value.len();
        }
        result
    }
}
