//! Minimal CLI: schema → (js | python | go) plain old objects
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser};
use colored::Colorize;
use rayon::prelude::*;

use crate::emit::{self, EmitOptions, Target};
use crate::lower::{build_ir, BuildOptions};
use crate::schema::SchemaDoc;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate plain-old-object data classes from a JSON Schema
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// input JSON Schema file
    schema: PathBuf,

    #[command(flatten)]
    outputs: OutputSettings,

    /// root namespace for JS JSDoc, package name for Go
    #[arg(long)]
    namespace: Option<String>,

    /// emit every definition, not only those reachable from the root
    #[arg(long, default_value_t = false)]
    full_definitions: bool,

    /// root type name when the schema has no title
    #[arg(long, default_value = "RootObject")]
    root_name: String,

    /// JSON Pointer selecting a subnode of the document as the schema root
    #[arg(long)]
    json_pointer: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// emit JavaScript classes to <PATH>
    #[arg(long = "output-js", value_name = "PATH")]
    js: Option<PathBuf>,

    /// emit Python classes to <PATH>
    #[arg(long = "output-python", value_name = "PATH")]
    python: Option<PathBuf>,

    /// emit Go structs to <PATH>
    #[arg(long = "output-go", value_name = "PATH")]
    go: Option<PathBuf>,
}

impl OutputSettings {
    fn enabled(&self) -> Vec<(&'static dyn Target, &PathBuf)> {
        let [js, python, go] = emit::targets();
        let mut out: Vec<(&'static dyn Target, &PathBuf)> = Vec::new();
        if let Some(p) = &self.js {
            out.push((js, p));
        }
        if let Some(p) = &self.python {
            out.push((python, p));
        }
        if let Some(p) = &self.go {
            out.push((go, p));
        }
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let outputs = self.outputs.enabled();
        if outputs.is_empty() {
            anyhow::bail!(
                "no target enabled; pass at least one of --output-js, --output-python, --output-go"
            );
        }

        let source = std::fs::read_to_string(&self.schema).with_context(|| {
            format!("failed to read schema file {}", self.schema.display())
        })?;
        let mut doc = SchemaDoc::parse(&source)?;
        if let Some(pointer) = &self.json_pointer {
            doc = doc.select(pointer)?;
        }

        let ir = build_ir(
            &doc,
            &BuildOptions {
                root_name: self.root_name.clone(),
                full_definitions: self.full_definitions,
            },
        )?;
        let emit_options = EmitOptions { namespace: self.namespace.clone() };

        // each target writes its own file; emission is independent per target
        let results: Vec<anyhow::Result<()>> = outputs
            .par_iter()
            .map(|(target, path)| {
                let rendered = emit::render(&ir, *target, &emit_options)?;
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create output directory {}", parent.display())
                    })?;
                }
                std::fs::write(path, rendered).with_context(|| {
                    format!("failed to write {}", path.display())
                })?;
                Ok(())
            })
            .collect();

        // a failed target does not stop the others; it fails the run
        let mut failed = false;
        for (result, (target, _)) in results.iter().zip(&outputs) {
            if let Err(error) = result {
                failed = true;
                eprintln!("{} [{}] {error:#}", "error:".red().bold(), target.name());
            }
        }
        if failed {
            anyhow::bail!("one or more targets failed");
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Tests
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_flags_map_to_targets_in_order() {
        let cli = CommandLineInterface::parse_from([
            "json-popo",
            "schema.json",
            "--output-go",
            "out.go",
            "--output-js",
            "out.js",
        ]);
        let enabled = cli.outputs.enabled();
        let names: Vec<_> = enabled.iter().map(|(t, _)| t.name()).collect();
        assert_eq!(names, ["js", "go"]);
    }

    #[test]
    fn no_targets_is_an_error() {
        let cli = CommandLineInterface::parse_from(["json-popo", "schema.json"]);
        let err = cli.run().unwrap_err();
        assert!(err.to_string().contains("no target enabled"));
    }
}
