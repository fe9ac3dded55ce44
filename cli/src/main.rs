//! pdfspot CLI - inspect saved extraction results

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use pdfspot::export::{self, JsonFormat};
use pdfspot::viewer::{resolve_box, search};
use pdfspot::{
    group_words, page_elements, read_extraction_file, to_surface_box, AlignOptions, BlockOptions,
    DecodeOptions, ElementId, ExtractedElement, TableReconstructor, Word,
};

#[derive(Parser)]
#[command(name = "pdfspot")]
#[command(version)]
#[command(
    about = "Inspect PDF extraction results: aligned tables, element location, page search",
    long_about = None
)]
struct Cli {
    /// Drop malformed bounding boxes instead of rejecting the file
    #[arg(long, global = true, env = "PDFSPOT_LENIENT")]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tables of an extraction response as aligned grids
    Tables {
        /// Saved extraction response
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only this page (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Output format
        #[arg(long, value_enum, default_value = "markdown")]
        format: OutputFormat,

        /// Move colliding fields to the nearest free column instead of dropping them
        #[arg(long)]
        nearest_free: bool,
    },

    /// Compute where an element is highlighted on a rendered page
    Locate {
        /// Saved extraction response
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page (1-based)
        #[arg(short, long)]
        page: u32,

        /// Element id (d-0, t-1, t1-h-0, t1-r2, t1-r2-c0)
        #[arg(long)]
        id: String,

        /// Page width at unit scale under the page rotation
        #[arg(long)]
        page_width: f32,

        /// Rendered surface width in pixels
        #[arg(long, conflicts_with = "zoom", required_unless_present = "zoom")]
        surface_width: Option<f32>,

        /// Zoom the page was rendered at
        #[arg(long)]
        zoom: Option<f32>,
    },

    /// Search one page's elements
    Search {
        /// Saved extraction response
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Case-insensitive search term
        #[arg(value_name = "TERM")]
        term: String,
    },

    /// Group positioned words into text blocks
    Blocks {
        /// JSON array of words ({text, x0, x1, top, bottom})
        #[arg(value_name = "WORDS")]
        input: PathBuf,

        /// Page index stamped on the blocks (0-based)
        #[arg(long, default_value = "0")]
        page_index: u32,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show element counts per page
    Info {
        /// Saved extraction response
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Source PDF, to report its header version
        #[arg(long, value_name = "PDF")]
        pdf: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Markdown tables
    Markdown,
    /// JSON grids
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let decode = if cli.lenient {
        DecodeOptions::new().lenient()
    } else {
        DecodeOptions::new()
    };

    let result = match cli.command {
        Commands::Tables {
            input,
            page,
            format,
            nearest_free,
        } => cmd_tables(&input, &decode, page, format, nearest_free),
        Commands::Locate {
            input,
            page,
            id,
            page_width,
            surface_width,
            zoom,
        } => cmd_locate(&input, &decode, page, &id, page_width, surface_width, zoom),
        Commands::Search { input, page, term } => cmd_search(&input, &decode, page, &term),
        Commands::Blocks {
            input,
            page_index,
            output,
            compact,
        } => cmd_blocks(&input, page_index, output.as_deref(), compact),
        Commands::Info { input, pdf } => cmd_info(&input, &decode, pdf.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load(
    input: &Path,
    decode: &DecodeOptions,
) -> Result<Vec<ExtractedElement>, Box<dyn std::error::Error>> {
    let elements = read_extraction_file(input, decode)?;
    log::debug!("Loaded {} elements from {}", elements.len(), input.display());
    Ok(elements)
}

fn page_index(page: u32) -> Result<u32, Box<dyn std::error::Error>> {
    page.checked_sub(1).ok_or_else(|| "Page numbers start at 1".into())
}

fn cmd_tables(
    input: &Path,
    decode: &DecodeOptions,
    page: Option<u32>,
    format: OutputFormat,
    nearest_free: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let elements = load(input, decode)?;
    let filter = page.map(page_index).transpose()?;

    let mut options = AlignOptions::new();
    if nearest_free {
        options = options.nearest_free();
    }
    let reconstructor = TableReconstructor::with_options(options);

    let tables: Vec<_> = elements
        .iter()
        .filter(|e| filter.map_or(true, |p| e.page_index() == p))
        .filter_map(|e| e.as_table())
        .collect();
    let grids = reconstructor.reconstruct_all(&tables);

    match format {
        OutputFormat::Json => {
            let grids: Vec<_> = grids.iter().flatten().collect();
            println!("{}", export::to_json(&grids, JsonFormat::Pretty)?);
        }
        OutputFormat::Markdown => {
            let mut shown = 0;
            for (table, grid) in tables.iter().zip(&grids) {
                let Some(grid) = grid else {
                    continue;
                };
                println!(
                    "{} {} ({} columns)",
                    "Table on page".cyan().bold(),
                    table.page_index + 1,
                    grid.column_count()
                );
                if grid.dropped > 0 {
                    println!(
                        "{}",
                        format!("{} field(s) dropped on collision", grid.dropped).yellow()
                    );
                }
                println!("{}", export::to_markdown(grid));
                shown += 1;
            }
            if shown == 0 {
                println!("{}", "No tables found.".yellow());
            }
        }
    }

    Ok(())
}

fn cmd_locate(
    input: &Path,
    decode: &DecodeOptions,
    page: u32,
    id: &str,
    page_width: f32,
    surface_width: Option<f32>,
    zoom: Option<f32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let elements = load(input, decode)?;
    let id: ElementId = id.parse()?;
    let page_elements = page_elements(&elements, page_index(page)?);

    let Some(bbox) = resolve_box(&page_elements, id, &AlignOptions::default()) else {
        println!("{} {} has no box on page {}", "Not locatable:".yellow(), id, page);
        return Ok(());
    };

    // a canvas truncates its size to whole pixels
    let surface_width = match (surface_width, zoom) {
        (Some(width), _) => width,
        (None, Some(zoom)) => (page_width * zoom).trunc(),
        (None, None) => return Err("Either --surface-width or --zoom is required".into()),
    };

    let mapped = to_surface_box(&bbox, page_width, surface_width)
        .ok_or("Page width must be a positive number")?;

    println!("{}: {}", "Element".bold(), id);
    println!(
        "{}: left {} top {} width {} height {}",
        "Document".bold(),
        bbox.left,
        bbox.top,
        bbox.width,
        bbox.height
    );
    println!(
        "{}: left {} top {} width {} height {}",
        "Surface".green().bold(),
        mapped.left,
        mapped.top,
        mapped.width,
        mapped.height
    );

    Ok(())
}

fn cmd_search(
    input: &Path,
    decode: &DecodeOptions,
    page: u32,
    term: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let elements = load(input, decode)?;
    let page_elements = page_elements(&elements, page_index(page)?);

    let hits = search(&page_elements, term);
    if hits.is_empty() {
        println!("{} \"{}\".", "No results found for".yellow(), term);
        return Ok(());
    }

    for hit in &hits {
        match hit.element {
            ExtractedElement::Text(block) => {
                println!("{} {}", format!("[{}]", hit.id()).dimmed(), block.text);
            }
            ExtractedElement::Table(table) => {
                println!("{} {}", format!("[{}]", hit.id()).dimmed(), "Table".cyan());
                if let Some(header) = table.header() {
                    println!("    {}", header.plain_text().bold());
                }
                for (r, row) in hit.body_rows() {
                    let id = ElementId::Row {
                        table: hit.index,
                        row: r,
                    };
                    println!("    {} {}", format!("[{}]", id).dimmed(), row.plain_text());
                }
            }
        }
    }

    Ok(())
}

fn cmd_blocks(
    input: &Path,
    page_index: u32,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let words: Vec<Word> = serde_json::from_str(&fs::read_to_string(input)?)?;
    let blocks = group_words(&words, page_index, &BlockOptions::default());

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = export::to_json(&serde_json::json!({ "extracted_data": blocks }), format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(
    input: &Path,
    decode: &DecodeOptions,
    pdf: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let elements = load(input, decode)?;

    println!("{}", "Extraction Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    if let Some(pdf) = pdf {
        let format = pdfspot::detect_format_from_path(pdf)?;
        println!("{}: {}", "Source".bold(), format);
    }
    println!("{}: {}", "Elements".bold(), elements.len());

    let mut pages: BTreeMap<u32, (usize, usize, usize)> = BTreeMap::new();
    for element in &elements {
        let entry = pages.entry(element.page_index() + 1).or_default();
        match element {
            ExtractedElement::Text(_) => entry.0 += 1,
            ExtractedElement::Table(_) => entry.1 += 1,
        }
        if !pdfspot::Locatable::is_locatable(element) {
            entry.2 += 1;
        }
    }

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if pages.is_empty() {
        println!("{}", "No content was extracted.".yellow());
    }
    for (page, (texts, tables, unplaced)) in pages {
        println!(
            "{} {}: {} text block(s), {} table(s), {} without a box",
            "Page".bold(),
            page,
            texts,
            tables,
            unplaced
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfspot".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF extraction inspection tool");
    println!();
    println!("License: MIT");
}
