use crate::config::validate_settings;
use crate::core::ConfigProvider;
use crate::domain::model::{
    ArtifactSelection, ExporterSettings, FloorplanSettings, TrainerSettings, DEFAULT_COLMAP_PATH,
};
use crate::utils::error::{FloorplanError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub train: TrainerSettings,
    #[serde(default)]
    pub export: ExporterSettings,
    #[serde(default)]
    pub floorplan: FloorplanSettings,
    #[serde(default)]
    pub artifacts: ArtifactOverrides,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: Option<String>,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "default_colmap_path")]
    pub colmap_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactOverrides {
    /// Exact training config to export from.
    pub config: Option<PathBuf>,
    /// Exact mesh to slice.
    pub mesh: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

fn default_colmap_path() -> String {
    DEFAULT_COLMAP_PATH.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FloorplanError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FloorplanError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_ROOT})，未定義者保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FloorplanError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 找出替換後仍殘留的 ${VAR}
    fn unresolved_env_var(path: &Path) -> Option<String> {
        let text = path.to_string_lossy();
        let start = text.find("${")? + 2;
        let end = text[start..].find('}')? + start;
        Some(text[start..end].to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        for (field, path) in [
            ("pipeline.data_dir", &self.pipeline.data_dir),
            ("pipeline.output_dir", &self.pipeline.output_dir),
        ] {
            if let Some(var) = Self::unresolved_env_var(path) {
                return Err(FloorplanError::MissingConfigError {
                    field: format!("environment variable {} (used by {})", var, field),
                });
            }
        }
        validation::validate_path("pipeline.data_dir", &self.pipeline.data_dir)?;
        validation::validate_path("pipeline.output_dir", &self.pipeline.output_dir)?;
        validation::validate_non_empty_string("pipeline.colmap_path", &self.pipeline.colmap_path)?;
        if let Some(config) = &self.artifacts.config {
            validation::validate_path("artifacts.config", config)?;
        }
        if let Some(mesh) = &self.artifacts.mesh {
            validation::validate_path("artifacts.mesh", mesh)?;
        }
        validate_settings(&self.train, &self.export, &self.floorplan)
    }

    pub fn name(&self) -> &str {
        self.pipeline.name.as_deref().unwrap_or("floorplan")
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn data_dir(&self) -> &Path {
        &self.pipeline.data_dir
    }

    fn output_dir(&self) -> &Path {
        &self.pipeline.output_dir
    }

    fn colmap_path(&self) -> &str {
        &self.pipeline.colmap_path
    }

    fn trainer(&self) -> TrainerSettings {
        self.train.clone()
    }

    fn exporter(&self) -> ExporterSettings {
        self.export.clone()
    }

    fn floorplan(&self) -> FloorplanSettings {
        self.floorplan.clone()
    }

    fn config_selection(&self) -> ArtifactSelection {
        ArtifactSelection::from_override(self.artifacts.config.clone())
    }

    fn mesh_selection(&self) -> ArtifactSelection {
        ArtifactSelection::from_override(self.artifacts.mesh.clone())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
