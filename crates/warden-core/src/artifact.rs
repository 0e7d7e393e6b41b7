use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;

use crate::error::WardenResult;
use crate::record::{ServiceId, ServiceRecord};

/// The wrapper configuration generated for one service. Rewritten on
/// create and on every configuration update.
#[derive(Debug, Serialize)]
struct WrapperArtifact<'a> {
    id: String,
    name: &'a str,
    executable: &'a Path,
    arguments: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    working_dir: Option<&'a Path>,
    restart_on_exit: bool,
    depends_on: Vec<String>,
}

impl<'a> WrapperArtifact<'a> {
    fn from_record(record: &'a ServiceRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: &record.name,
            executable: &record.executable,
            arguments: &record.arguments,
            working_dir: record.working_dir.as_deref(),
            restart_on_exit: record.restart_on_exit,
            depends_on: record.dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Renders and writes the generated wrapper configuration artifacts
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the artifact for a given service
    pub fn artifact_path(&self, id: &ServiceId) -> PathBuf {
        self.dir.join(format!("{}.toml", id))
    }

    /// Render the wrapper configuration for a record
    pub fn render(&self, record: &ServiceRecord) -> WardenResult<String> {
        Ok(toml::to_string_pretty(&WrapperArtifact::from_record(
            record,
        ))?)
    }

    /// Render and write the artifact, creating the directory on first use
    pub async fn write(&self, record: &ServiceRecord) -> WardenResult<PathBuf> {
        let contents = self.render(record)?;
        fs::create_dir_all(&self.dir).await?;
        let path = self.artifact_path(&record.id);
        fs::write(&path, contents).await?;
        Ok(path)
    }

    /// Remove the artifact for a service, ignoring a missing file
    pub async fn remove(&self, id: &ServiceId) -> WardenResult<()> {
        let path = self.artifact_path(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ServiceSpec;

    fn record() -> ServiceRecord {
        ServiceRecord::from_spec(ServiceSpec {
            name: "web".to_string(),
            executable: PathBuf::from("/opt/web/server"),
            arguments: vec!["--port".to_string(), "8080".to_string()],
            working_dir: Some(PathBuf::from("/opt/web")),
            dependencies: Vec::new(),
            auto_start: false,
            restart_on_exit: true,
        })
    }

    #[test]
    fn test_render_contains_fields() {
        let writer = ArtifactWriter::new(PathBuf::from("/tmp"));
        let rendered = writer.render(&record()).unwrap();
        assert!(rendered.contains("web"));
        assert!(rendered.contains("restart_on_exit = true"));
    }

    #[tokio::test]
    async fn test_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("artifacts"));
        let record = record();

        let path = writer.write(&record).await.unwrap();
        assert!(path.exists());

        writer.remove(&record.id).await.unwrap();
        assert!(!path.exists());

        // removing again is fine
        writer.remove(&record.id).await.unwrap();
    }
}
