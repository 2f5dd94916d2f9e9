//! monowav - convert WAV files to 16-bit mono PCM

use anyhow::{Context, bail};
use clap::Parser;
use std::process;
use monowav::processing::{output_file_name, BatchOptions};
use monowav::{init_logging, Args, Config, ConversionRequest, Converter};

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if let Some(path) = &args.write_default_config {
        Config::create_default_config(path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let Some(input) = args.input.clone() else {
        bail!("No input given. Pass a WAV file or a directory");
    };

    let config = Config::from_args_and_config(&args)?;
    init_logging(config.verbose);
    if config.verbose {
        println!("{}", monowav::get_library_info());
        println!();
    }

    let converter = Converter::from_config(&config).context("Encoder check failed")?;

    if input.is_dir() {
        if args.output.is_some() {
            bail!("--output only applies to a single input file; use --output-dir for directories");
        }

        let options = BatchOptions::from_config(&input, &config);
        let report = converter
            .convert_all(&options)
            .with_context(|| format!("Batch conversion of {} stopped", input.display()))?;

        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(_) => println!("{}", outcome.destination.display()),
                Err(e) => println!("FAILED {}: {}", outcome.source.display(), e),
            }
        }
        println!("Converted {} file(s), {} failed", report.converted(), report.failed());

        if !report.is_success() {
            bail!("{} file(s) failed", report.failed());
        }
    } else {
        let output = match &args.output {
            Some(path) => path.clone(),
            None => {
                let name = input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("Input path has no file name")?;
                input.with_file_name(output_file_name(
                    &name,
                    config.conversion.selected_channel,
                    config.conversion.sample_rate,
                ))
            }
        };

        let request = ConversionRequest::new(&input, &output)
            .channel(config.conversion.selected_channel)
            .sample_rate(config.conversion.sample_rate)
            .overwrite(config.conversion.overwrite);

        let summary = converter
            .convert(&request)
            .with_context(|| format!("Failed to convert {}", input.display()))?;
        println!("{}", summary.destination.display());
    }

    Ok(())
}
