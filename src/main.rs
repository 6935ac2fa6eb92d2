//! mailman - inline CSS into HTML email

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use mailman::css::Stylesheet;
use mailman::util::decode_document;
use mailman::{InlinerOptions, StyleInliner};

#[derive(Parser)]
#[command(name = "mailman")]
#[command(version, about = "Inline CSS into HTML email", long_about = None)]
#[command(after_help = "EXAMPLES:
    mailman mail.html -c email.css           Print inlined HTML
    mailman mail.html -c a.css -c b.css -o out.html
    mailman mail.html -c email.css --stats   Also report skipped CSS")]
struct Cli {
    /// Input HTML file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Stylesheet to inline (repeatable, applied in order)
    #[arg(short, long = "css", value_name = "CSS")]
    css: Vec<String>,

    /// Write output here instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Keep <style> elements as they are
    #[arg(long)]
    keep_style_tags: bool,

    /// Do not carry @media blocks into a <style> element
    #[arg(long)]
    drop_media_queries: bool,

    /// Reject input larger than this many bytes
    #[arg(long, value_name = "N")]
    max_bytes: Option<usize>,

    /// Print what was skipped to stderr
    #[arg(long)]
    stats: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if cli.quiet {
        "error"
    } else {
        "warn"
    }))
    .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> mailman::Result<()> {
    let html = read_text(&cli.input)?;

    let mut css = String::new();
    for path in &cli.css {
        css.push_str(&read_text(path)?);
        css.push('\n');
    }

    let mut options = InlinerOptions::default()
        .strip_style_tags(!cli.keep_style_tags)
        .preserve_media_queries(!cli.drop_media_queries);
    if let Some(limit) = cli.max_bytes {
        options = options.max_input_bytes(limit);
    }
    let inliner = StyleInliner::new().with_options(options);

    let sheet = Stylesheet::parse(&css);
    let inlined = inliner.convert_stylesheet(&html, &sheet)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &inlined.html)?;
            if !cli.quiet {
                eprintln!("Inlined {} -> {path}", cli.input);
            }
        }
        None => println!("{}", inlined.html),
    }

    if cli.stats {
        let d = inlined.diagnostics;
        eprintln!("Rules: {}", sheet.rules.len());
        eprintln!("Styled elements: {}", d.styled_elements);
        eprintln!("Skipped rules: {}", d.stylesheet.skipped_rules);
        eprintln!("Skipped selectors: {}", d.stylesheet.skipped_selectors);
        eprintln!(
            "Skipped declarations: {}",
            d.stylesheet.skipped_declarations + d.skipped_inline_declarations
        );
        eprintln!("HTML parse errors: {}", d.html_parse_errors);
    }

    Ok(())
}

/// Read a file and decode it according to its declared charset.
fn read_text(path: &str) -> mailman::Result<String> {
    let bytes = std::fs::read(Path::new(path))?;
    Ok(decode_document(&bytes).into_owned())
}
