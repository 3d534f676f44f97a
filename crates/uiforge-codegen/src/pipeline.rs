//! Regeneration pipeline.
//!
//! Walks the registry, renders every component, merges safe regions
//! from any existing artifact, and writes the result atomically. One
//! failing component never blocks the rest of the batch; failures are
//! collected into the report and the artifact on disk is left as it
//! was.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use uiforge_core::{ComponentRegistry, RegisteredComponent};

use crate::engine::{ComponentGenerator, GenerateError};
use crate::merge::{MergeError, replace_safe_regions};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// One component whose artifact could not be regenerated.
#[derive(Debug)]
pub struct ArtifactFailure {
    pub component: String,
    pub path: PathBuf,
    pub error: PipelineError,
}

/// Outcome of a full regeneration run.
#[derive(Debug, Default)]
pub struct RegenerationReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ArtifactFailure>,
}

impl RegenerationReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Regenerates component artifacts on disk.
pub struct Regenerator {
    generator: ComponentGenerator,
    // Artifacts are shared files; only one batch may touch them at a
    // time within a process.
    lock: Mutex<()>,
}

impl Regenerator {
    pub fn new(generator: ComponentGenerator) -> Self {
        Self {
            generator,
            lock: Mutex::new(()),
        }
    }

    /// Regenerate every registered component. Individual failures are
    /// recorded in the report; the run itself only fails on a poisoned
    /// lock, which cannot happen because regeneration does not panic
    /// while holding it.
    pub fn run(&self, registry: &ComponentRegistry) -> RegenerationReport {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut report = RegenerationReport::default();
        for component in registry.components() {
            let path = artifact_path(component);
            match self.regenerate_one(component, &path) {
                Ok(()) => {
                    info!(component = %component.descriptor.name, path = %path.display(), "artifact written");
                    report.written.push(path);
                }
                Err(error) => {
                    warn!(component = %component.descriptor.name, path = %path.display(), %error, "artifact skipped");
                    report.failures.push(ArtifactFailure {
                        component: component.descriptor.name.clone(),
                        path,
                        error,
                    });
                }
            }
        }
        report
    }

    fn regenerate_one(
        &self,
        component: &RegisteredComponent,
        path: &Path,
    ) -> Result<(), PipelineError> {
        let mut source = self.generator.generate(&component.descriptor)?;

        if path.exists() {
            let previous = fs::read_to_string(path)?;
            source = replace_safe_regions(&source, &previous)?;
        }

        write_atomic(path, &source)?;
        Ok(())
    }
}

impl Default for Regenerator {
    fn default() -> Self {
        Self::new(ComponentGenerator::new())
    }
}

fn artifact_path(component: &RegisteredComponent) -> PathBuf {
    let descriptor = &component.descriptor;
    component
        .frontend_dir
        .join("src")
        .join("components")
        .join(format!(
            "{}.{}",
            descriptor.name,
            descriptor.ui_framework.artifact_extension()
        ))
}

/// Write via a sibling temp file and rename, so a crash mid-write
/// never leaves a truncated artifact.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use uiforge_core::{
        ComponentDescriptor, ComponentKind, FieldMeta, FieldOptions, FieldType, ModelSchema,
        TableOptions, UiFramework,
    };

    fn invoice_model() -> ModelSchema {
        ModelSchema {
            name: "invoice".to_string(),
            primary_key: "id".to_string(),
            fields: vec![
                FieldMeta::new("id", FieldType::Serial),
                FieldMeta::new("total", FieldType::Decimal),
            ],
        }
    }

    fn table_descriptor(name: &str) -> ComponentDescriptor {
        ComponentDescriptor::build(
            name,
            UiFramework::Vue,
            &invoice_model(),
            ComponentKind::Table(TableOptions {
                max_items_per_page: 10,
                addable_by_roles: BTreeSet::new(),
                removable_by_roles: BTreeSet::new(),
            }),
            vec![FieldOptions::new("total")],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn fresh_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ComponentRegistry::new();
        registry.register(table_descriptor("InvoiceTable"), dir.path());

        let report = Regenerator::default().run(&registry);
        assert!(!report.has_failures());
        assert_eq!(report.written.len(), 1);

        let artifact = dir.path().join("src/components/InvoiceTable.vue");
        let contents = fs::read_to_string(&artifact).unwrap();
        assert!(contents.contains("<!-- SAFE REGION BEGIN -->"));
    }

    #[test]
    fn regeneration_preserves_safe_region_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ComponentRegistry::new();
        registry.register(table_descriptor("InvoiceTable"), dir.path());

        let regenerator = Regenerator::default();
        regenerator.run(&registry);

        let artifact = dir.path().join("src/components/InvoiceTable.vue");
        let contents = fs::read_to_string(&artifact).unwrap();
        let edited = contents.replace(
            "/* SAFE REGION BEGIN */",
            "/* SAFE REGION BEGIN */\nimport helper from './helper';",
        );
        fs::write(&artifact, &edited).unwrap();

        let report = regenerator.run(&registry);
        assert!(!report.has_failures());
        let regenerated = fs::read_to_string(&artifact).unwrap();
        assert!(regenerated.contains("import helper from './helper';"));
    }

    #[test]
    fn structure_mismatch_keeps_old_artifact_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ComponentRegistry::new();
        registry.register(table_descriptor("BrokenTable"), dir.path());
        registry.register(table_descriptor("GoodTable"), dir.path());

        let regenerator = Regenerator::default();
        regenerator.run(&registry);

        // Hand-edit away a whole region so the counts disagree.
        let broken = dir.path().join("src/components/BrokenTable.vue");
        let contents = fs::read_to_string(&broken).unwrap();
        let mangled = contents
            .replace("<!-- SAFE REGION BEGIN -->", "")
            .replace("<!-- SAFE REGION END -->", "");
        fs::write(&broken, &mangled).unwrap();

        let report = regenerator.run(&registry);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].component, "BrokenTable");
        assert!(matches!(
            report.failures[0].error,
            PipelineError::Merge(MergeError::StructureMismatch { .. })
        ));

        // The mangled artifact was not overwritten, and the healthy
        // component was still regenerated.
        assert_eq!(fs::read_to_string(&broken).unwrap(), mangled);
        assert_eq!(report.written.len(), 1);
        assert!(report.written[0].ends_with("src/components/GoodTable.vue"));
    }
}
