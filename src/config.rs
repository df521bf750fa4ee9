use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file structure for WorkLens.
///
/// Holds the connection details for the Azure DevOps collection plus output
/// preferences. Configuration files are loaded from the current directory or
/// a specified path; when none exists a template is written for the operator
/// to fill in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Azure DevOps connection details
    pub azure: AzureConfig,

    /// Output preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AzureConfig {
    /// Collection base URL (e.g., 'https://tfs.example.com/tfs/DefaultCollection')
    pub collection_url: String,

    /// Team project name
    pub project: String,

    /// Personal access token used for basic authentication
    pub personal_access_token: String,

    /// Work item edit URL template; `{id}` is replaced with the item identifier
    pub edit_item_url: String,

    /// WIQL query selecting the work items to report on
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path the HTML report is written to
    #[serde(default = "default_report_path")]
    pub report_path: String,

    /// Number of parent items shown in the console preview
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            preview_count: default_preview_count(),
        }
    }
}

fn default_report_path() -> String {
    "report.html".to_string()
}

fn default_preview_count() -> usize {
    10
}

/// Default query: items closed within the last three days.
const TEMPLATE_QUERY: &str = "\
SELECT [System.Id], [System.WorkItemType], [System.Title], [System.AssignedTo], [System.State] \
FROM WorkItems \
WHERE [System.TeamProject] = @project \
AND [System.WorkItemType] <> '' \
AND [System.State] <> '' \
AND [Microsoft.VSTS.Common.ClosedDate] > @today - 3 \
AND [Microsoft.VSTS.Common.ClosedDate] < @today + 1";

impl Config {
    /// Placeholder configuration written when no config file exists.
    pub fn template() -> Self {
        Self {
            azure: AzureConfig {
                collection_url: "https://tfs.example.com/tfs/DefaultCollection".to_string(),
                project: "SomeProject".to_string(),
                personal_access_token: "<<create a PAT from your user account>>".to_string(),
                edit_item_url:
                    "https://tfs.example.com/tfs/DefaultCollection/SomeProject/_workitems/edit/{id}"
                        .to_string(),
                query: TEMPLATE_QUERY.to_string(),
            },
            output: OutputConfig::default(),
        }
    }

    /// Load configuration, or write a template and return `None`.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./worklens.toml
    /// 3. ./worklens.json
    /// 4. ./worklens.yaml
    /// 5. ./worklens.yml
    ///
    /// When no candidate exists, a `worklens.toml` template is written for
    /// the operator to fill in and `Ok(None)` is returned; the caller is
    /// expected to exit without error.
    pub fn load_or_init(path: Option<&Path>) -> Result<Option<Self>> {
        if let Some(path) = path {
            return Self::load_from_path(path).map(Some);
        }

        // Try common configuration file names
        let candidates = [
            "worklens.toml",
            "worklens.json",
            "worklens.yaml",
            "worklens.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path).map(Some);
            }
        }

        // No config file found; write a template for the operator to fill in
        let template_path = Path::new(candidates[0]);
        Self::template().save(template_path)?;
        Ok(None)
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_template_config() {
        let config = Config::template();
        assert!(config.azure.edit_item_url.contains("{id}"));
        assert!(config.azure.query.starts_with("SELECT"));
        assert_eq!(config.output.report_path, "report.html");
        assert_eq!(config.output.preview_count, 10);
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[azure]
collection-url = "https://tfs.example.com/tfs/DefaultCollection"
project = "Fabrikam"
personal-access-token = "pat-test-token"
edit-item-url = "https://tfs.example.com/Fabrikam/_workitems/edit/{id}"
query = "SELECT [System.Id] FROM WorkItems"

[output]
report-path = "out.html"
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.azure.project, "Fabrikam");
        assert_eq!(config.azure.personal_access_token, "pat-test-token");
        assert_eq!(config.output.report_path, "out.html");
        assert_eq!(config.output.preview_count, 10);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "azure": {
    "collection-url": "https://tfs.json.example.com",
    "project": "JsonProject",
    "personal-access-token": "pat-json",
    "edit-item-url": "https://tfs.json.example.com/_workitems/edit/{id}",
    "query": "SELECT [System.Id] FROM WorkItems"
  }
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.azure.project, "JsonProject");
        assert_eq!(config.output.report_path, "report.html");
    }

    #[test]
    fn test_missing_config_writes_template() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let loaded = Config::load_or_init(None).unwrap();
        assert!(loaded.is_none());
        assert!(Path::new("worklens.toml").exists());

        // A second run picks the template up instead of rewriting it
        let reloaded = Config::load_or_init(None).unwrap();
        assert!(reloaded.is_some());

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    fn test_template_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("worklens.toml");

        Config::template().save(&path).unwrap();
        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.azure.project, Config::template().azure.project);
        assert_eq!(loaded.azure.query, Config::template().azure.query);
    }
}
