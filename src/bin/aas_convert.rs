// SPDX-License-Identifier: MIT
//! Convert between AAS JSON documents, XML documents and AASX packages

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aas_adapter::{
    read_document, write_document, CodecConfig, Diagnostics, DocumentFormat, Identifier,
    InMemoryFileStore, KeyElements, ObjectStore, PackageReader, PackageWriter,
    SupplementaryFileStore,
};

#[derive(Parser)]
#[command(name = "aas-convert", version, about)]
struct Cli {
    /// Input file (.json, .xml or .aasx)
    input: PathBuf,

    /// Output file (.json, .xml or .aasx)
    output: PathBuf,

    /// Abort on the first malformed construct instead of dropping it
    #[arg(long)]
    strict: bool,

    /// Skip nested element collections when decoding
    #[arg(long)]
    stripped: bool,

    /// Format of the document parts inside an .aasx output
    #[arg(long)]
    format: Option<DocumentFormat>,

    /// Keep submodels in their shell's document part
    #[arg(long)]
    no_split: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Document(DocumentFormat),
    Package,
}

fn file_kind(path: &Path) -> anyhow::Result<FileKind> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if extension.eq_ignore_ascii_case("aasx") {
        return Ok(FileKind::Package);
    }
    match DocumentFormat::from_extension(extension) {
        Some(format) => Ok(FileKind::Document(format)),
        None => bail!(
            "{}: unsupported extension, expected .json, .xml or .aasx",
            path.display()
        ),
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let mut config = CodecConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    if cli.strict {
        config.failsafe = false;
    }
    if cli.stripped {
        config.stripped = true;
    }
    if let Some(format) = cli.format {
        config.document_format = format;
    }
    if cli.no_split {
        config.split_submodels = false;
    }

    let input_kind = file_kind(&cli.input)?;
    let output_kind = file_kind(&cli.output)?;

    let mut store = ObjectStore::new();
    let mut files = InMemoryFileStore::new();
    let mut diags = Diagnostics::new();
    let options = config.decode_options();
    let mut core_properties = None;

    match input_kind {
        FileKind::Document(format) => {
            let data = fs::read(&cli.input)
                .with_context(|| format!("failed to read {}", cli.input.display()))?;
            read_document(format, &data, &mut store, &options, &mut diags)?;
        }
        FileKind::Package => {
            let mut reader = PackageReader::open(&cli.input)
                .with_context(|| format!("failed to open {}", cli.input.display()))?;
            reader.read_into(&mut store, &mut files, &options, &mut diags)?;
            core_properties = reader.core_properties()?;
            reader.close();
        }
    }
    info!(
        objects = store.len(),
        files = files.len(),
        errors = diags.error_count(),
        warnings = diags.warning_count(),
        "read {}",
        cli.input.display()
    );

    match output_kind {
        FileKind::Document(format) => {
            if !files.is_empty() {
                warn!(
                    files = files.len(),
                    "supplementary files are not carried over into a plain document"
                );
            }
            let data = write_document(format, store.iter())?;
            fs::write(&cli.output, data)
                .with_context(|| format!("failed to write {}", cli.output.display()))?;
        }
        FileKind::Package => {
            write_package(&cli.output, &store, &files, &config, core_properties)?;
        }
    }
    info!(path = %cli.output.display(), "conversion finished");
    Ok(())
}

fn write_package(
    path: &Path,
    store: &ObjectStore,
    files: &InMemoryFileStore,
    config: &CodecConfig,
    core_properties: Option<aas_adapter::CoreProperties>,
) -> anyhow::Result<()> {
    let mut writer = PackageWriter::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let format = config.document_format;

    let mut covered: HashSet<Identifier> = HashSet::new();
    let shells: Vec<Identifier> = store
        .iter()
        .filter_map(|object| object.as_shell())
        .map(|shell| shell.identification.clone())
        .collect();
    for id in &shells {
        writer.write_shell(id, store, files, format, config.split_submodels)?;
        if let Some(shell) = store.get_shell(id) {
            covered.insert(id.clone());
            covered.extend(shell.asset.identifier());
            covered.extend(shell.submodels.iter().filter_map(|r| r.identifier()));
            covered.extend(
                shell
                    .concept_dictionaries
                    .iter()
                    .flat_map(|d| &d.concept_descriptions)
                    .filter_map(|r| r.identifier())
                    .filter(|id| {
                        store
                            .get(id)
                            .is_some_and(|o| o.key_element() == KeyElements::ConceptDescription)
                    }),
            );
        }
    }

    // objects no shell refers to end up in one shared part
    let rest: Vec<Identifier> = store
        .identifiers()
        .filter(|id| !covered.contains(*id))
        .cloned()
        .collect();
    if !rest.is_empty() {
        let part = format!("/aasx/data.{}", format.extension());
        writer.write_objects(&part, &rest, store, files, format, false, Vec::new())?;
    }

    let mut properties = core_properties.unwrap_or_default();
    let now = Utc::now();
    properties.created.get_or_insert(now);
    properties.modified = Some(now);
    writer.write_core_properties(&properties)?;

    writer.close()?.flush()?;
    Ok(())
}
