//! Recursive key-name scan.

use std::collections::BTreeSet;

use super::value::Value;
use super::PiiViolationError;

/// Key names that carry student identity.
pub const DEFAULT_PII_KEYS: &[&str] = &[
    "name",
    "studentName",
    "student_name",
    "fullName",
    "full_name",
    "firstName",
    "first_name",
    "lastName",
    "last_name",
    "localId",
    "local_id",
    "district_student_id",
    "districtStudentId",
];

/// Set of forbidden key names. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    keys: BTreeSet<String>,
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_PII_KEYS.iter().copied())
    }
}

impl Denylist {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// The default keys plus `extra`.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(
            extra
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.trim().is_empty()),
        );
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Dotted paths of every denylisted key in `value`, in document order.
    ///
    /// List elements contribute their index as a path segment
    /// (`students.0.name`). A key is reported whatever its value, and
    /// scanning continues below it.
    pub fn scan(&self, value: &Value) -> Vec<String> {
        let mut found = Vec::new();
        self.walk(value, None, &mut found);
        found
    }

    fn walk(&self, value: &Value, path: Option<&str>, found: &mut Vec<String>) {
        let join = |segment: &str| match path {
            Some(prefix) => format!("{}.{}", prefix, segment),
            None => segment.to_string(),
        };

        match value {
            Value::Map(entries) => {
                for (key, child) in entries {
                    let child_path = join(key);
                    if self.contains(key) {
                        found.push(child_path.clone());
                    }
                    self.walk(child, Some(&child_path), found);
                }
            }
            Value::List(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.walk(child, Some(&join(&index.to_string())), found);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }
}

/// Scan with the default denylist.
pub fn scan(value: &Value) -> Vec<String> {
    Denylist::default().scan(value)
}

/// Fail with every offending path if `value` contains a denylisted key.
pub fn validate_no_pii(value: &Value, denylist: &Denylist) -> Result<(), PiiViolationError> {
    let forbidden_key_paths = denylist.scan(value);
    if forbidden_key_paths.is_empty() {
        Ok(())
    } else {
        Err(PiiViolationError {
            forbidden_key_paths,
        })
    }
}
