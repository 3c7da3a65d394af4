//! CLI logic for the Stencil template tool.
//!
//! This module contains the core CLI logic: `detect` writes the detection
//! reports for a structure file, and `plan` writes a batch mapping plan.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, DetectArgs, PlanArgs};

use std::fs;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use stencil::{
    StencilError, TemplateBuilder,
    batch::{self, Mapping},
    hints::Hints,
    report::VariableReport,
    variable::VariableRecord,
};

/// Run the Stencil CLI application
///
/// # Errors
///
/// Returns `StencilError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Unparsable structure, hints, mapping or row files
pub fn run(args: &Args) -> Result<(), StencilError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let builder = TemplateBuilder::new(app_config);

    match &args.command {
        Command::Detect(detect) => run_detect(&builder, detect),
        Command::Plan(plan) => run_plan(&builder, plan),
    }
}

fn run_detect(builder: &TemplateBuilder, args: &DetectArgs) -> Result<(), StencilError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Detecting variables"
    );

    let source = fs::read_to_string(&args.input)?;
    let hints = match &args.hints {
        Some(path) => builder.parse_hints(&fs::read_to_string(path)?)?,
        None => Hints::new(),
    };

    let parsed = builder.parse(&source)?;
    let detection = builder.detect(parsed, &hints);

    let validation = &detection.integrity().validation_report;
    if !validation.valid {
        warn!(errors = validation.errors, warnings = validation.warnings; "Structure has integrity errors");
    }

    write_json(&args.output, &detection)?;
    info!(
        output_file = args.output,
        variables = detection.variables().total_variables;
        "Detection written"
    );
    Ok(())
}

fn run_plan(builder: &TemplateBuilder, args: &PlanArgs) -> Result<(), StencilError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Planning batch"
    );

    let source = fs::read_to_string(&args.input)?;
    let mapping: Mapping = serde_json::from_str(&fs::read_to_string(&args.mapping)?)?;
    let rows = batch::rows_from_json(&fs::read_to_string(&args.rows)?)?;

    let plan = match &args.variables {
        Some(path) => {
            let variables = read_variables(&fs::read_to_string(path)?)?;
            let parsed = builder.parse(&source)?;
            builder.plan(&parsed.document, &variables, &mapping, &rows)
        }
        None => {
            let parsed = builder.parse(&source)?;
            let detection = builder.detect(parsed, &Hints::new());
            builder.plan(
                detection.document(),
                &detection.variables().variables,
                &mapping,
                &rows,
            )
        }
    };

    write_json(&args.output, &plan)?;
    info!(
        output_file = args.output,
        success = plan.success_count,
        failed = plan.failed_count;
        "Plan written"
    );
    Ok(())
}

/// Variables as written by `detect`, as a bare variable report, or as a
/// plain record list.
#[derive(Deserialize)]
#[serde(untagged)]
enum VariablesFile {
    Detection { variables: VariableReport },
    Report(VariableReport),
    Records(Vec<VariableRecord>),
}

fn read_variables(source: &str) -> Result<Vec<VariableRecord>, StencilError> {
    let file: VariablesFile = serde_json::from_str(source)?;
    Ok(match file {
        VariablesFile::Detection { variables } | VariablesFile::Report(variables) => {
            variables.variables
        }
        VariablesFile::Records(records) => records,
    })
}

fn write_json(path: &str, value: &impl Serialize) -> Result<(), StencilError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
