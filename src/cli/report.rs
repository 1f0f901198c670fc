//! Report formatting and printing utilities.
//!
//! Declarations go to stdout (text or JSON); diagnostics go to stderr.
//! Separate from core logic so pyzod can be used as a library.

use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;

use crate::diagnostics::{Diagnostics, Severity};
use crate::extract::Parsed;
use crate::model::{ClassDecl, ClassField};

use super::args::OutputFormat;

/// Print the run result: declarations on stdout, diagnostics on stderr.
pub fn print(parsed: &Parsed, format: OutputFormat, verbose: bool) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_classes_to(&parsed.classes, &mut io::stdout().lock())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(parsed)?;
            println!("{}", json);
        }
    }
    print_diagnostics_to(&parsed.diagnostics, verbose, &mut io::stderr().lock())?;
    Ok(())
}

/// Render the ordered declarations in a readable, Python-flavored listing.
pub fn print_classes_to<W: Write>(classes: &[ClassDecl], writer: &mut W) -> Result<()> {
    for (i, class) in classes.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        print_class(class, writer)?;
    }
    Ok(())
}

fn print_class<W: Write>(class: &ClassDecl, writer: &mut W) -> Result<()> {
    let header = if class.base_classes.is_empty() {
        format!("class {}:", class.name)
    } else {
        format!("class {}({}):", class.name, class.base_classes.join(", "))
    };
    writeln!(writer, "{}", header.bold())?;

    if let Some(comment) = &class.comment {
        writeln!(writer, "    {}", format!("\"\"\"{}\"\"\"", comment).dimmed())?;
    }

    if class.fields.is_empty() && class.comment.is_none() {
        writeln!(writer, "    pass")?;
    }

    for field in &class.fields {
        print_field(field, writer)?;
    }
    Ok(())
}

fn print_field<W: Write>(field: &ClassField, writer: &mut W) -> Result<()> {
    let mut line = format!("    {}: {}", field.name, field.ty.to_string().cyan());
    if let Some(default) = &field.default_value {
        line.push_str(&format!(" = {}", default));
    }
    writeln!(writer, "{}", line)?;
    if let Some(comment) = &field.comment {
        writeln!(writer, "    {}", format!("\"\"\"{}\"\"\"", comment).dimmed())?;
    }
    Ok(())
}

/// Render diagnostics, cargo-style. Info messages only appear in verbose
/// mode; warnings always print.
pub fn print_diagnostics_to<W: Write>(
    diagnostics: &Diagnostics,
    verbose: bool,
    writer: &mut W,
) -> Result<()> {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity {
            Severity::Warning => {
                writeln!(
                    writer,
                    "{}{} {}",
                    "warning".yellow().bold(),
                    ":".bold(),
                    diagnostic.message
                )?;
            }
            Severity::Info if verbose => {
                writeln!(writer, "{}", diagnostic.message.dimmed())?;
            }
            Severity::Info => {}
        }
    }

    let warnings = diagnostics.warning_count();
    if warnings > 0 {
        writeln!(
            writer,
            "{}",
            format!(
                "{} warning{} emitted",
                warnings,
                if warnings == 1 { "" } else { "s" }
            )
            .yellow()
        )?;
    }
    Ok(())
}
