//! Model resource naming for the `projects/*/models/*` collection.

use crate::InputError;

/// Identifies the model (and optionally the version) a prediction runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub project: String,
    pub model: String,
    /// `None` targets the model's default version.
    pub version: Option<String>,
}

impl ModelRef {
    pub fn new(
        project: impl Into<String>,
        model: impl Into<String>,
        version: Option<String>,
    ) -> Result<Self, InputError> {
        let project = project.into();
        let model = model.into();
        if project.is_empty() {
            return Err(InputError::EmptyName("project"));
        }
        if model.is_empty() {
            return Err(InputError::EmptyName("model name"));
        }
        Ok(Self {
            project,
            model,
            version,
        })
    }

    /// `projects/{project}/models/{model}[/versions/{version}]`
    pub fn resource_name(&self) -> String {
        let mut name = format!("projects/{}/models/{}", self.project, self.model);
        if let Some(version) = &self.version {
            name.push_str(&format!("/versions/{version}"));
        }
        name
    }

    /// Full `:predict` URL for this model under `base_url`.
    pub fn predict_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}:predict",
            base_url.trim_end_matches('/'),
            self.resource_name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BASE_URL;

    #[test]
    fn no_version_omits_segment() {
        let model = ModelRef::new("acme", "churn", None).unwrap();
        assert_eq!(model.resource_name(), "projects/acme/models/churn");
        assert_eq!(
            model.predict_url(BASE_URL),
            "https://ml.googleapis.com/v1/projects/acme/models/churn:predict"
        );
    }

    #[test]
    fn version_is_included_literally() {
        let model = ModelRef::new("acme", "churn", Some("v1".into())).unwrap();
        assert_eq!(
            model.predict_url(BASE_URL),
            "https://ml.googleapis.com/v1/projects/acme/models/churn/versions/v1:predict"
        );
    }

    #[test]
    fn empty_model_name_rejected() {
        let err = ModelRef::new("acme", "", None).unwrap_err();
        assert!(matches!(err, InputError::EmptyName("model name")));
    }

    #[test]
    fn empty_project_rejected() {
        let err = ModelRef::new("", "churn", None).unwrap_err();
        assert!(matches!(err, InputError::EmptyName("project")));
    }
}
