//! Render SVG document into PNG image
#![deny(warnings)]

use std::{
    env,
    fs::File,
    io::{BufWriter, Read},
};
use svg_raster::*;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    input_file: String,
    output_file: String,
    options: RenderOptions,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args {
            input_file: String::new(),
            output_file: String::new(),
            options: RenderOptions::default(),
        };
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "render".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-c" => {
                    let config = args.next().ok_or("-c requires argument")?;
                    result.options = RenderOptions::from_json(&std::fs::read_to_string(config)?)?;
                }
                _ => {
                    positional += 1;
                    match positional {
                        1 => result.input_file = arg,
                        2 => result.output_file = arg,
                        _ => return Err("unexpected positional argument".into()),
                    }
                }
            }
        }
        if positional < 2 {
            eprintln!("Render SVG document into PNG image");
            eprintln!("\nUSAGE:");
            eprintln!("    {} [-c <options.json>] <input.svg> <output.png>", cmd);
            eprintln!("\nARGS:");
            eprintln!("    -c <options.json>  rendering options");
            eprintln!("    <input.svg>        SVG document ('-' means stdin)");
            eprintln!("    <output.png>       image rendered in the PNG format ('-' means stdout)");
            std::process::exit(1);
        }
        Ok(result)
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;

    let mut text = String::new();
    if args.input_file != "-" {
        File::open(&args.input_file)?.read_to_string(&mut text)?;
    } else {
        std::io::stdin().read_to_string(&mut text)?;
    }

    let Rendered { canvas, report } = render_document(&text, &args.options)?;
    for dropped in report.dropped.iter() {
        eprintln!("dropped {}", dropped);
    }
    tracing::debug!("[report] {}", report.to_json());

    let _save = tracing::debug_span!("[save]").entered();
    if args.output_file != "-" {
        canvas.write_png(BufWriter::new(File::create(args.output_file)?))?;
    } else {
        canvas.write_png(std::io::stdout().lock())?;
    }
    Ok(())
}
