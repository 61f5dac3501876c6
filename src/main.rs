//! md2cv - Markdown résumé to PDF/DOCX converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use md2cv::{Conversion, Format, list_templates};

#[derive(Parser)]
#[command(name = "md2cv")]
#[command(version, about = "Convert a Markdown résumé to PDF and DOCX", long_about = None)]
#[command(after_help = "EXAMPLES:
    md2cv cv.md                      Write output/cv.pdf and output/cv.docx
    md2cv cv.md -f pdf -t modern     PDF only, with the modern template
    md2cv --list-templates           List available templates")]
struct Cli {
    /// Input Markdown file with YAML frontmatter
    #[arg(value_name = "INPUT", required_unless_present = "list_templates")]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::All)]
    format: FormatArg,

    /// Template name
    #[arg(short, long, value_name = "NAME")]
    template: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Directory containing templates
    #[arg(long, value_name = "DIR", default_value = "templates")]
    templates_dir: PathBuf,

    /// Pass raw HTML in the Markdown through instead of escaping it
    #[arg(long)]
    raw_html: bool,

    /// List available templates and exit
    #[arg(long)]
    list_templates: bool,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Pdf,
    Docx,
    All,
}

impl FormatArg {
    fn formats(self) -> &'static [Format] {
        match self {
            FormatArg::Pdf => &[Format::Pdf],
            FormatArg::Docx => &[Format::Docx],
            FormatArg::All => &[Format::Pdf, Format::Docx],
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_templates {
        let names = list_templates(&cli.templates_dir);
        if names.is_empty() {
            println!("no templates found in {}", cli.templates_dir.display());
        } else {
            for name in names {
                println!("{name}");
            }
        }
        return ExitCode::SUCCESS;
    }

    let input = cli.input.clone().expect("input required");
    let conversion = Conversion {
        input,
        template: cli.template.clone(),
        templates_dir: cli.templates_dir.clone(),
        output_dir: cli.output_dir.clone(),
        raw_html: cli.raw_html,
    };

    let outcomes = match conversion.run(cli.format.formats()) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut wrote_any = false;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(()) => {
                wrote_any = true;
                if !cli.quiet {
                    println!(
                        "\u{2713} {} created: {}",
                        outcome.format.label(),
                        outcome.path.display()
                    );
                }
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }

    // One successful format still counts as a usable run.
    if wrote_any {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
