use std::fs;
use std::num::NonZeroUsize;
use std::str::FromStr;

use rectcast::cli::parse_cli;
use rectcast::pipeline::{PipelineConfig, PipelineError, run_pipeline};
use rectcast::settings::EffectiveSettings;
use rectcast::{EncodeReport, inspect};
use rectcast_source::{Backend, Configuration, EnvOverrides, SourceError};

fn print_available_backends() {
    println!("available backends:");
    for backend in Configuration::available_backends() {
        println!("  {backend}");
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), PipelineError> {
    let (args, sources) = parse_cli();

    if args.list_backends {
        print_available_backends();
        return Ok(());
    }

    if let Some(path) = args.inspect.as_deref() {
        return inspect::run(path);
    }

    let env = EnvOverrides::from_env()?;
    let settings = EffectiveSettings::resolve(&args, &sources, &env)?;

    let mut config = Configuration::default();
    if let Some(backend) = settings.backend.as_deref() {
        config.backend = Backend::from_str(backend)?;
    }
    config.input = settings.input.clone();
    if let Some(fps) = settings.fps {
        config.fps = Some(f64::from(fps));
    }
    config.target_size = settings.target_size;
    config.channel_capacity = settings.channel_capacity.and_then(NonZeroUsize::new);

    let available = Configuration::available_backends();
    if !available.contains(&config.backend) {
        return Err(SourceError::unsupported(config.backend.as_str()).into());
    }

    let provider = config.create_provider()?;
    let pipeline_config = PipelineConfig::from_settings(&settings);
    let report = run_pipeline(provider, &pipeline_config).await?;

    print_report(&report);

    if let Some(path) = settings.report_json.as_deref() {
        let json = serde_json::to_string_pretty(&report).map_err(|err| {
            SourceError::configuration(format!("failed to serialize encode report: {err}"))
        })?;
        fs::write(path, json).map_err(SourceError::from)?;
    }

    Ok(())
}

fn print_report(report: &EncodeReport) {
    println!(
        "wrote {} frames ({} rects) at {} fps to {}",
        report.frames,
        report.rects,
        report.frame_rate,
        report.output.display()
    );
    if let Some(reason) = report.short_reason.as_deref() {
        eprintln!("warning: input ended early, container is short: {reason}");
    }
}
