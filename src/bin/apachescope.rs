use anyhow::Context;
use apachescope::{driver, embedding, filter, plot, projection, windowing};
use chrono::Duration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "apachescope",
    version,
    about = "Apache error-log event classification and sequence embedding"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

// Every path defaults to the pipeline's fixed location, so a flagless run of
// each stage chains into the next.
#[derive(Subcommand, Debug)]
enum Command {
    /// Classify raw log lines into the tabular event form
    Classify {
        #[arg(long, default_value = "Apache.log")]
        input: PathBuf,
        #[arg(long, default_value = "classified_logs.csv")]
        output: PathBuf,
    },
    /// Extract the rows still classified as unknown (E0)
    Filter {
        #[arg(long, default_value = "classified_logs.csv")]
        input: PathBuf,
        #[arg(long, default_value = "e0_classified_logs.csv")]
        output: PathBuf,
    },
    /// Window the classified table, embed event sequences, persist the matrix
    Embed {
        #[arg(long, default_value = "classified_logs.csv")]
        input: PathBuf,
        #[arg(long, default_value = "log_event_vectors_5min.json")]
        model: PathBuf,
        #[arg(long, default_value = "log_sequence_matrix_5min.json")]
        matrix: PathBuf,
        #[arg(long, default_value_t = windowing::DEFAULT_WINDOW_MINUTES)]
        window_minutes: i64,
    },
    /// Project the sequence matrix with PCA and render scatter plots
    Plot {
        #[arg(long, default_value = "log_sequence_matrix_5min.json")]
        matrix: PathBuf,
        #[arg(long = "out-2d", default_value = "log_sequences_pca_2d.svg")]
        out_2d: PathBuf,
        #[arg(long = "out-3d", default_value = "log_sequences_pca_3d.svg")]
        out_3d: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Classify { input, output } => {
            let rows = driver::classify_file(&input, &output)?;
            println!("{} generated with {rows} classified rows", output.display());
        }
        Command::Filter { input, output } => {
            let kept = filter::filter_unknown(&input, Some(&output))?;
            println!(
                "{} unknown-event rows extracted to {}",
                kept.len().saturating_sub(1),
                output.display()
            );
        }
        Command::Embed {
            input,
            model,
            matrix,
            window_minutes,
        } => {
            let records = windowing::read_records(&input)?;
            let sequences =
                windowing::build_window_sequences(&records, Duration::minutes(window_minutes));
            anyhow::ensure!(
                !sequences.is_empty(),
                "no log sequence events generated from {}",
                input.display()
            );
            println!(
                "generated {} log sequence events with a {window_minutes}-minute window",
                sequences.len()
            );
            let m = embedding::EventVectorModel::load_or_train(
                &model,
                &sequences,
                embedding::TrainParams::default(),
            )
            .context("embedding model unavailable")?;
            let seq_matrix = embedding::sequence_matrix(&m, &sequences);
            embedding::save_matrix(&seq_matrix, &matrix)?;
            println!(
                "log sequence matrix {:?} saved to {}",
                seq_matrix.dim(),
                matrix.display()
            );
        }
        Command::Plot {
            matrix,
            out_2d,
            out_3d,
        } => {
            let m = embedding::load_matrix(&matrix)
                .with_context(|| format!("cannot load sequence matrix {}", matrix.display()))?;
            let m = m.mapv(f64::from);
            let pca_2d = projection::pca(&m, 2)?;
            plot::scatter_2d(&pca_2d.projected, &out_2d)?;
            let pca_3d = projection::pca(&m, 3)?;
            plot::scatter_3d(&pca_3d.projected, &out_3d)?;
            println!(
                "scatter plots written to {} and {}",
                out_2d.display(),
                out_3d.display()
            );
        }
    }
    Ok(())
}
