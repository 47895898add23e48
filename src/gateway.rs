use crate::model::TopicNode;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAP_EXTENSION: &str = "json";
const INBOX_EXTENSION: &str = "inbox";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid project name: {0:?}")]
    InvalidProject(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Map is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage for project trees. The editor calls `save` after every committed
/// change and `load` when switching projects.
pub trait SyncGateway {
    fn save(&mut self, project: &str, tree: &TopicNode) -> Result<(), GatewayError>;

    /// A project that has never been saved yields the default tree.
    fn load(&mut self, project: &str) -> Result<TopicNode, GatewayError>;

    fn projects(&self) -> Result<Vec<String>, GatewayError> {
        Ok(Vec::new())
    }

    /// Pending ideas handed to the reorganizer.
    fn inbox(&self, _project: &str) -> Result<Vec<String>, GatewayError> {
        Ok(Vec::new())
    }

    fn clear_inbox(&mut self, _project: &str) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Keeps each project in `<dir>/<project>.json`, with pending ideas in
/// `<dir>/<project>.inbox`, one per line.
#[derive(Debug, Clone)]
pub struct FileGateway {
    dir: PathBuf,
}

impl FileGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn project_path(&self, project: &str, extension: &str) -> Result<PathBuf, GatewayError> {
        if !is_valid_project_name(project) {
            return Err(GatewayError::InvalidProject(project.to_string()));
        }
        Ok(self.dir.join(format!("{project}.{extension}")))
    }
}

impl SyncGateway for FileGateway {
    fn save(&mut self, project: &str, tree: &TopicNode) -> Result<(), GatewayError> {
        let path = self.project_path(project, MAP_EXTENSION)?;
        fs::create_dir_all(&self.dir).map_err(|e| classify(e, &self.dir))?;

        // Write next to the target and rename so a failed write never
        // truncates the previous map.
        let tmp = path.with_extension(format!("{MAP_EXTENSION}.tmp"));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)
            .map_err(|e| classify(e, &tmp))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, tree)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &path).map_err(|e| classify(e, &path))?;

        tracing::debug!(project, path = %path.display(), "saved map");
        Ok(())
    }

    fn load(&mut self, project: &str) -> Result<TopicNode, GatewayError> {
        let path = self.project_path(project, MAP_EXTENSION)?;
        if !path.exists() {
            tracing::debug!(project, "no stored map, starting from default");
            return Ok(TopicNode::default());
        }
        let file = File::open(&path).map_err(|e| classify(e, &path))?;
        let tree = serde_json::from_reader(BufReader::new(file))?;
        Ok(tree)
    }

    fn projects(&self) -> Result<Vec<String>, GatewayError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut projects = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MAP_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_project_name(stem) {
                    projects.push(stem.to_string());
                }
            }
        }
        projects.sort();
        Ok(projects)
    }

    fn inbox(&self, project: &str) -> Result<Vec<String>, GatewayError> {
        let path = self.project_path(project, INBOX_EXTENSION)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(|e| classify(e, &path))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn clear_inbox(&mut self, project: &str) -> Result<(), GatewayError> {
        let path = self.project_path(project, INBOX_EXTENSION)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(classify(e, &path)),
        }
    }
}

/// Letters, digits, `-` and `_`, so a project always maps to one file in the
/// data directory.
pub fn is_valid_project_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

fn classify(err: io::Error, path: &Path) -> GatewayError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => {
            GatewayError::PermissionDenied(path.display().to_string())
        }
        _ => GatewayError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> TopicNode {
        TopicNode::new("r", "Root").with_children(vec![TopicNode::new("a", "A")])
    }

    #[test]
    fn test_save_and_load_cycle() {
        let dir = tempdir().unwrap();
        let mut gateway = FileGateway::new(dir.path());

        gateway.save("ideas", &sample()).unwrap();
        let loaded = gateway.load("ideas").unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_missing_project_gives_default() {
        let dir = tempdir().unwrap();
        let mut gateway = FileGateway::new(dir.path());

        let loaded = gateway.load("fresh").unwrap();
        assert_eq!(loaded.id, "root");
        assert_eq!(loaded.topic, "Central Topic");
        assert!(loaded.children.is_empty());
    }

    #[test]
    fn test_load_malformed_json_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let mut gateway = FileGateway::new(dir.path());

        assert!(matches!(gateway.load("broken"), Err(GatewayError::Json(_))));
    }

    #[test]
    fn test_invalid_project_names() {
        let dir = tempdir().unwrap();
        let mut gateway = FileGateway::new(dir.path());

        assert!(matches!(
            gateway.save("../escape", &sample()),
            Err(GatewayError::InvalidProject(_))
        ));
        assert!(matches!(
            gateway.load(""),
            Err(GatewayError::InvalidProject(_))
        ));
    }

    #[test]
    fn test_projects_are_listed_sorted() {
        let dir = tempdir().unwrap();
        let mut gateway = FileGateway::new(dir.path());
        gateway.save("work", &sample()).unwrap();
        gateway.save("home", &sample()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(gateway.projects().unwrap(), ["home", "work"]);
    }

    #[test]
    fn test_inbox_read_and_clear() {
        let dir = tempdir().unwrap();
        let mut gateway = FileGateway::new(dir.path());
        fs::write(dir.path().join("ideas.inbox"), "first\n\n  second  \n").unwrap();

        assert_eq!(gateway.inbox("ideas").unwrap(), ["first", "second"]);
        gateway.clear_inbox("ideas").unwrap();
        assert!(gateway.inbox("ideas").unwrap().is_empty());
        // Clearing twice is fine
        gateway.clear_inbox("ideas").unwrap();
    }
}
