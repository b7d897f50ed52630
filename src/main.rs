//! # Etiqueta CLI
//!
//! Command-line interface for rendering label designs.
//!
//! ## Usage
//!
//! ```bash
//! # ZPL for every row, to stdout
//! etiqueta zpl --design etiqueta.json --rows filas.json
//!
//! # 300 dpi printer, with a column mapping
//! etiqueta zpl --design etiqueta.json --rows filas.json --mapping columnas.json --dpi 300
//!
//! # Sheet of labels as PDF
//! etiqueta pdf --design etiqueta.json --rows filas.json --options hoja.json -o etiquetas.pdf
//!
//! # Preview the third row as PNG
//! etiqueta preview --design etiqueta.json --rows filas.json --row 2 --png preview.png
//!
//! # Template function catalog
//! etiqueta functions
//!
//! # Check a barcode value
//! etiqueta validate ean13 7791234567898
//! ```
//!
//! Set `RUST_LOG=debug` to see per-label progress and skipped elements.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use etiqueta::{
    EtiquetaError,
    code::{BarcodeFormat, validate_barcode},
    design::{ColumnMapping, Design, Row, mapping_from_json, rows_from_json},
    expr::catalog,
    printer::{Dpi, PrinterConfig},
    render::{
        batch::Batch,
        document::{Document, DocumentOptions},
        preview::{PreviewFrame, PreviewOptions},
        printer,
        scene::compose_label,
    },
    text::{BuiltinMetrics, FontMetrics, TtfMetrics},
};

/// Etiqueta - label rendering utility
#[derive(Parser, Debug)]
#[command(name = "etiqueta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Design and data inputs shared by the rendering commands.
#[derive(clap::Args, Debug)]
struct Inputs {
    /// Design JSON file
    #[arg(long, value_name = "FILE")]
    design: PathBuf,

    /// Rows JSON file (array of objects); omit for a single static label
    #[arg(long, value_name = "FILE")]
    rows: Option<PathBuf>,

    /// Element-id to column mapping JSON file
    #[arg(long, value_name = "FILE")]
    mapping: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render ZPL printer commands
    Zpl {
        #[command(flatten)]
        inputs: Inputs,

        /// Printer resolution (203, 300 or 600)
        #[arg(long, default_value = "203")]
        dpi: Dpi,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a paginated PDF document
    Pdf {
        #[command(flatten)]
        inputs: Inputs,

        /// Document options JSON file (page format, margins, grid, copies)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Render one label as a PNG preview
    Preview {
        #[command(flatten)]
        inputs: Inputs,

        /// Zero-based row to preview
        #[arg(long, default_value = "0")]
        row: usize,

        /// Preview options JSON file (panel size, max zoom)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// TrueType font for metrics and glyphs (Spleen bitmap font otherwise)
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Output PNG file
        #[arg(long, value_name = "FILE")]
        png: PathBuf,
    },

    /// List template functions
    Functions {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a barcode value against its symbology
    Validate {
        /// Barcode format (code128, ean13, upc, itf14, ...)
        format: String,

        /// Value to check
        value: String,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), EtiquetaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Zpl { inputs, dpi, output } => {
            let (design, rows, mapping) = inputs.load()?;
            let batch = Batch::new(&design, &rows, &mapping);
            let config = PrinterConfig::new(dpi);

            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
                None => Box::new(std::io::stdout().lock()),
            };
            // labels are written as they are produced
            for (i, label) in printer::labels(&batch, &config, &BuiltinMetrics).enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                write!(out, "{}", label)?;
            }
            writeln!(out)?;
            out.flush()?;

            if let Some(path) = output {
                eprintln!("Wrote {} labels to {}", batch.len(), path.display());
            }
        }

        Commands::Pdf {
            inputs,
            options,
            output,
        } => {
            let (design, rows, mapping) = inputs.load()?;
            let options = match options {
                Some(path) => DocumentOptions::from_json(&read(&path)?)?,
                None => DocumentOptions::default(),
            };
            let batch = Batch::new(&design, &rows, &mapping);
            let document = Document::from_batch(&batch, &options, &BuiltinMetrics);
            std::fs::write(&output, document.to_pdf()?)?;
            eprintln!(
                "Wrote {} labels on {} pages to {}",
                document.label_count(),
                document.pages.len(),
                output.display()
            );
        }

        Commands::Preview {
            inputs,
            row,
            options,
            font,
            png,
        } => {
            let (design, rows, mapping) = inputs.load()?;
            let options: PreviewOptions = match options {
                Some(path) => serde_json::from_str(&read(&path)?)?,
                None => PreviewOptions::default(),
            };
            let batch = Batch::new(&design, &rows, &mapping);
            if row >= batch.len() {
                return Err(EtiquetaError::InvalidInput(format!(
                    "row {} out of range, the batch has {} labels",
                    row,
                    batch.len()
                )));
            }

            let ttf = match font {
                Some(path) => Some(
                    TtfMetrics::from_bytes(std::fs::read(&path)?, None)
                        .map_err(|e| EtiquetaError::InvalidInput(e.to_string()))?,
                ),
                None => None,
            };
            let metrics: &dyn FontMetrics = match &ttf {
                Some(ttf) => ttf,
                None => &BuiltinMetrics,
            };

            let scene = compose_label(&design, batch.row(row), &mapping, &batch.context(row), metrics);
            let frame = PreviewFrame::new(scene, &options);
            let image = match &ttf {
                Some(ttf) => frame.to_image_with_font(ttf),
                None => frame.to_image()?,
            };
            image
                .save(&png)
                .map_err(|e| EtiquetaError::InvalidInput(format!("Failed to save PNG: {}", e)))?;
            eprintln!("Saved {}x{} preview to {}", frame.width_px, frame.height_px, png.display());
        }

        Commands::Functions { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog::FUNCTION_CATALOG)?);
                return Ok(());
            }
            for (category, functions) in catalog::by_category() {
                println!("{}:", category.label());
                for info in functions {
                    println!("  {:<40} {}", info.example, info.description);
                }
                println!();
            }
        }

        Commands::Validate { format, value } => {
            let format = BarcodeFormat::from_name(&format).ok_or_else(|| {
                EtiquetaError::InvalidInput(format!(
                    "Unknown barcode format '{}'. Known formats: {}",
                    format,
                    BarcodeFormat::ALL.map(|f| f.name()).join(", ")
                ))
            })?;
            let validation = validate_barcode(format, &value);
            if validation.valid {
                println!("{}: valid", format);
            } else {
                return Err(EtiquetaError::InvalidInput(validation.message));
            }
        }
    }

    Ok(())
}

impl Inputs {
    fn load(&self) -> Result<(Design, Vec<Row>, ColumnMapping), EtiquetaError> {
        let design = Design::from_json(&read(&self.design)?)?;
        for id in design.duplicate_ids() {
            log::warn!("duplicate element id '{}', mappings apply to all of them", id);
        }
        let rows = match &self.rows {
            Some(path) => rows_from_json(&read(path)?)?,
            None => Vec::new(),
        };
        let mapping = match &self.mapping {
            Some(path) => mapping_from_json(&read(path)?)?,
            None => ColumnMapping::new(),
        };
        Ok((design, rows, mapping))
    }
}

fn read(path: &Path) -> Result<String, EtiquetaError> {
    std::fs::read_to_string(path)
        .map_err(|e| EtiquetaError::InvalidInput(format!("{}: {}", path.display(), e)))
}
