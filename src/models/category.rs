use serde::{Deserialize, Serialize};

use crate::error::{RegisterError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Create and full-replace payload for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RegisterError::Validation("name must not be blank".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        assert!(NewCategory::new("  ", None).validate().is_err());
        assert!(NewCategory::new("Operacional", Some("Procesos internos")).validate().is_ok());
    }

    #[test]
    fn test_description_is_optional_on_the_wire() {
        let parsed: NewCategory = serde_json::from_str(r#"{"name":"Legal"}"#).unwrap();
        assert_eq!(parsed, NewCategory::new("Legal", None));
    }
}
