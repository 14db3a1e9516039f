//! Native command-line entry point: slice an image into an N x M grid and
//! write the resulting ZIP archive. The browser build replaces this with
//! the WASM bindings in `wasm.rs`.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use anyhow::{Context, bail};
    use clap::Parser;
    use gridslice::grid::Axis;
    use gridslice::{DosDateTime, SlicerConfig, SlicerSession, export_filename};

    #[derive(Parser, Debug)]
    #[command(name = "gridslice")]
    #[command(about = "Slice an image into a grid and export the pieces as a ZIP archive")]
    #[command(version)]
    struct Cli {
        /// Input image (PNG, JPEG, WebP, BMP, TIFF)
        input: PathBuf,

        /// Output archive path (default: timestamped name next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Number of rows, 1-8
        #[arg(short, long)]
        rows: Option<usize>,

        /// Number of columns, 1-8
        #[arg(short, long)]
        cols: Option<usize>,

        /// Row divider positions as fractions in (0,1), comma separated,
        /// overriding the even split (e.g. "0.3,0.7")
        #[arg(long, value_name = "FRACTIONS")]
        row_splits: Option<String>,

        /// Column divider positions as fractions in (0,1), comma separated
        #[arg(long, value_name = "FRACTIONS")]
        col_splits: Option<String>,
    }

    fn parse_splits(raw: &str) -> anyhow::Result<Vec<f64>> {
        raw.split(',')
            .map(|s| {
                s.trim()
                    .parse::<f64>()
                    .with_context(|| format!("invalid split position '{}'", s.trim()))
            })
            .collect()
    }

    /// Apply explicit divider positions: the count comes from the number of
    /// positions, each one then clamped by the usual ordering rules.
    fn apply_splits(session: &mut SlicerSession, axis: Axis, raw: &str) -> anyhow::Result<()> {
        let splits = parse_splits(raw)?;
        if splits.len() + 1 > gridslice::constants::MAX_SPLITS {
            bail!(
                "too many splits: {} (maximum {})",
                splits.len(),
                gridslice::constants::MAX_SPLITS - 1
            );
        }
        session.grid.set_count(axis, splits.len() + 1);
        for (index, value) in splits.iter().enumerate() {
            session.grid.set_breakpoint(axis, index, *value);
        }
        Ok(())
    }

    pub fn run() -> anyhow::Result<()> {
        let cli = Cli::parse();
        let config = SlicerConfig::load();

        let default_filter = config.log_level.to_level_filter().to_string();
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(&default_filter),
        )
        .init();

        let bytes = std::fs::read(&cli.input)
            .with_context(|| format!("failed to read {}", cli.input.display()))?;
        let name = cli
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let mut session = SlicerSession::from_bytes(&name, &bytes)?;
        session
            .grid
            .set_count(Axis::Row, cli.rows.unwrap_or(config.default_rows));
        session
            .grid
            .set_count(Axis::Col, cli.cols.unwrap_or(config.default_cols));
        if let Some(raw) = &cli.row_splits {
            apply_splits(&mut session, Axis::Row, raw)?;
        }
        if let Some(raw) = &cli.col_splits {
            apply_splits(&mut session, Axis::Col, raw)?;
        }

        session.slice()?;
        session.stage_all();
        let archive = session.export(DosDateTime::now())?;

        let output = cli.output.unwrap_or_else(|| {
            let filename = export_filename(&config.export_prefix, chrono::Local::now().naive_local());
            cli.input.with_file_name(filename)
        });
        std::fs::write(&output, &archive)
            .with_context(|| format!("failed to write {}", output.display()))?;

        let (width, height) = session.dimensions();
        println!(
            "{}: {}x{} -> {} slices, {} ({} bytes)",
            name,
            width,
            height,
            session.processing().len(),
            output.display(),
            archive.len()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = cli::run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
