//! Generation Pipeline
//!
//! Runs one generation pass over already resolved kinds:
//!
//! ```text
//! Kinds -> expand -> render instance units -> render root
//!       -> partition into groups -> write (optional) -> dependency list
//! ```
//!
//! All expansion happens before anything touches the disk, so a malformed
//! tree never leaves partial output behind. Writes are independent per file.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::codegen::{CodegenError, KindCalls, UnitRenderer};
use crate::expand::{expand_kind, ExpandError, Instance};
use crate::group::{partition, GroupingOptions, Partition};
use crate::model::Kind;
use crate::writer::{IdempotentWriter, WriteError, WriteStats, WriterConfig};

/// Errors of a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("configuration error: {0}")]
    Expand(#[from] ExpandError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Options of one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory receiving generated units
    pub out_dir: PathBuf,
    /// Persist units to disk
    pub emit_files: bool,
    /// Merge units into compilation groups
    pub grouping: Option<GroupingOptions>,
    /// Writer polling behaviour
    pub writer: WriterConfig,
}

impl GenerateOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            emit_files: false,
            grouping: None,
            writer: WriterConfig::default(),
        }
    }

    pub fn emit_files(mut self, emit: bool) -> Self {
        self.emit_files = emit;
        self
    }

    pub fn grouping(mut self, grouping: Option<GroupingOptions>) -> Self {
        self.grouping = grouping;
        self
    }
}

/// A rendered unit and its target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub path: PathBuf,
    pub content: String,
}

/// Output of one kind.
#[derive(Debug, Clone)]
pub struct KindOutput {
    pub kind: String,
    pub instances: Vec<Instance>,
    /// One unit per instance, same order as `instances`
    pub units: Vec<GeneratedUnit>,
    /// Merged units, present when the kind was grouped
    pub groups: Option<Vec<GeneratedUnit>>,
}

impl KindOutput {
    /// Units handed to the build for this kind
    pub fn build_units(&self) -> &[GeneratedUnit] {
        self.groups.as_deref().unwrap_or(&self.units)
    }
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub kinds: Vec<KindOutput>,
    pub root: GeneratedUnit,
    /// Root path first, then each kind's build units in kind order
    pub dependencies: Vec<PathBuf>,
    pub stats: WriteStats,
}

impl GenerationReport {
    /// Dependency paths joined by `;`
    pub fn deps_line(&self) -> String {
        self.dependencies
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Human-readable trace of every instance and unit
    pub fn write_trace(&self, out: &mut dyn Write) -> io::Result<()> {
        for kind in &self.kinds {
            for (instance, unit) in kind.instances.iter().zip(&kind.units) {
                writeln!(out, "{:?}", instance.hierarchy)?;
                writeln!(out, "{}", unit.path.display())?;
                writeln!(out, "{}", unit.content)?;
            }
        }
        writeln!(out, "{}", self.root.path.display())?;
        writeln!(out, "{}", self.root.content)?;
        for kind in &self.kinds {
            for group in kind.groups.iter().flatten() {
                let name = group.path.file_name().unwrap_or_default();
                writeln!(out, "{}", Path::new(name).display())?;
                writeln!(out, "{}", group.content)?;
            }
        }
        Ok(())
    }
}

/// Run one generation pass.
pub fn generate(
    kinds: &[Kind],
    renderer: &dyn UnitRenderer,
    opts: &GenerateOptions,
) -> GenerateResult<GenerationReport> {
    let expanded = kinds
        .iter()
        .map(|kind| Ok((kind.name.clone(), expand_kind(kind)?)))
        .collect::<GenerateResult<Vec<_>>>()?;

    let ext = renderer.extension();
    let unit_path = |stem: &str| opts.out_dir.join(format!("{stem}.{ext}"));

    let mut outputs = Vec::with_capacity(expanded.len());
    for (kind, instances) in expanded {
        let units = instances
            .iter()
            .map(|inst| {
                Ok(GeneratedUnit {
                    path: unit_path(&inst.identifier),
                    content: renderer.render_instance(&kind, inst)?,
                })
            })
            .collect::<GenerateResult<Vec<_>>>()?;

        let groups = {
            let contents: HashMap<&str, &str> = instances
                .iter()
                .zip(&units)
                .map(|(inst, unit)| (inst.identifier.as_str(), unit.content.as_str()))
                .collect();
            opts.grouping.as_ref().and_then(|grouping| {
                match partition(&instances, grouping) {
                    Partition::Ungrouped => None,
                    Partition::Grouped(groups) => Some(
                        groups
                            .iter()
                            .map(|group| GeneratedUnit {
                                path: unit_path(&group.file_stem()),
                                content: group
                                    .members
                                    .iter()
                                    .map(|m| contents[m.identifier.as_str()])
                                    .collect(),
                            })
                            .collect(),
                    ),
                }
            })
        };

        outputs.push(KindOutput {
            kind,
            instances,
            units,
            groups,
        });
    }

    let calls: Vec<KindCalls<'_>> = outputs
        .iter()
        .map(|out| KindCalls {
            kind: &out.kind,
            identifiers: out
                .instances
                .iter()
                .map(|i| i.identifier.as_str())
                .collect(),
        })
        .collect();
    let root = GeneratedUnit {
        path: unit_path("root"),
        content: renderer.render_root(&calls)?,
    };

    let mut writer = IdempotentWriter::new(opts.writer.clone());
    if opts.emit_files {
        fs::create_dir_all(&opts.out_dir).map_err(|source| GenerateError::OutputDir {
            path: opts.out_dir.clone(),
            source,
        })?;
        for unit in outputs.iter().flat_map(|out| &out.units) {
            writer.update(&unit.path, &unit.content)?;
        }
        writer.update(&root.path, &root.content)?;
        for group in outputs.iter().flat_map(|out| out.groups.iter().flatten()) {
            writer.update(&group.path, &group.content)?;
        }
    }

    let mut dependencies = vec![root.path.clone()];
    for out in &outputs {
        dependencies.extend(out.build_units().iter().map(|u| u.path.clone()));
    }

    let stats = writer.stats();
    info!(
        kinds = outputs.len(),
        instances = outputs.iter().map(|o| o.instances.len()).sum::<usize>(),
        units = dependencies.len(),
        written = stats.written,
        unchanged = stats.unchanged,
        "generation finished"
    );

    Ok(GenerationReport {
        kinds: outputs,
        root,
        dependencies,
        stats,
    })
}
