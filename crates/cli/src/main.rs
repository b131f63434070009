use analysis_client::render::{
    render_analysis, render_genre_stats, render_similarity, render_skating_report,
    render_video_failure, report_page,
};
use analysis_client::{
    collect_intervals, parse_interval, AnalysisService, ClientConfig, ClientError, ColorSlotKind,
    EditSession, ErrorKind, FilterMode, HttpService, ImageBlob, SourceRef, VideoWorkflow,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "coverstudio-cli")]
#[command(about = "Cover Studio CLI - book cover editing and skating jump analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Analysis server base URL (overrides the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Client config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug, Clone)]
struct ImageArgs {
    /// Local image file
    #[arg(long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Remote image URL
    #[arg(long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract design features from a cover
    Analyze {
        #[command(flatten)]
        image: ImageArgs,

        /// Write an HTML report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Run a chain of edits, each on the result of the previous one
    Edit {
        #[command(flatten)]
        image: ImageArgs,

        /// Edit step: filter:<mode>, color:<x>,<y>, point:<x>,<y>:<r>,<g>,<b>,
        /// replace:<tx>,<ty>:<nx>,<ny>[:<tolerance>]
        #[arg(long = "step", required = true)]
        steps: Vec<EditStep>,

        /// Save the final image
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write an HTML report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Rank dataset covers by similarity
    Similar {
        #[command(flatten)]
        image: ImageArgs,

        /// Number of results (defaults to the config value)
        #[arg(long)]
        top_n: Option<u32>,

        /// Write an HTML report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Dataset-wide design statistics
    Stats {
        /// Recompute instead of using the server cache
        #[arg(long)]
        refresh: bool,

        /// Write an HTML report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Analyze jumps in a figure skating video
    Skating {
        /// Local video file
        #[arg(long, conflicts_with = "youtube")]
        file: Option<PathBuf>,

        /// YouTube URL
        #[arg(long)]
        youtube: Option<String>,

        /// Jump interval in seconds, e.g. 75-78
        #[arg(long = "interval", required = true)]
        intervals: Vec<String>,

        /// Client-side deadline (defaults to the config value)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Write an HTML report
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

/// One step of an `edit` chain.
#[derive(Debug, Clone, PartialEq)]
enum EditStep {
    Filter(FilterMode),
    Color { x: u32, y: u32 },
    Point { x: u32, y: u32, rgb: [u8; 3] },
    Replace {
        target: (f64, f64),
        new: (f64, f64),
        tolerance: Option<u32>,
    },
}

fn parse_pair<T: FromStr>(raw: &str) -> Option<(T, T)> {
    let (a, b) = raw.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_rgb(raw: &str) -> Option<[u8; 3]> {
    let mut parts = raw.split(',').map(|p| p.trim().parse::<u8>());
    let rgb = [parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?];
    parts.next().is_none().then_some(rgb)
}

impl FromStr for EditStep {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("step `{s}` has no arguments"))?;
        let bad = || format!("malformed {kind} step `{s}`");
        match kind {
            "filter" => Ok(Self::Filter(rest.parse()?)),
            "color" => {
                let (x, y) = parse_pair(rest).ok_or_else(bad)?;
                Ok(Self::Color { x, y })
            }
            "point" => {
                let (xy, rgb) = rest.split_once(':').ok_or_else(bad)?;
                let (x, y) = parse_pair(xy).ok_or_else(bad)?;
                let rgb = parse_rgb(rgb).ok_or_else(bad)?;
                Ok(Self::Point { x, y, rgb })
            }
            "replace" => {
                let mut parts = rest.split(':');
                let target = parts.next().and_then(parse_pair).ok_or_else(bad)?;
                let new = parts.next().and_then(parse_pair).ok_or_else(bad)?;
                let tolerance = match parts.next() {
                    Some(t) => Some(t.trim().parse().map_err(|_| bad())?),
                    None => None,
                };
                if parts.next().is_some() {
                    return Err(bad());
                }
                Ok(Self::Replace {
                    target,
                    new,
                    tolerance,
                })
            }
            other => Err(format!(
                "unknown step `{other}` (filter, color, point, replace)"
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    let config = load_config(cli.config.as_deref(), cli.server)?;
    info!("Using analysis server at {}", config.server_url);

    match cli.command {
        Commands::Analyze { image, report } => analyze_command(config, image, report).await,
        Commands::Edit {
            image,
            steps,
            output,
            report,
        } => edit_command(config, image, steps, output, report).await,
        Commands::Similar {
            image,
            top_n,
            report,
        } => similar_command(config, image, top_n, report).await,
        Commands::Stats { refresh, report } => stats_command(config, refresh, report).await,
        Commands::Skating {
            file,
            youtube,
            intervals,
            timeout_secs,
            report,
        } => skating_command(config, file, youtube, intervals, timeout_secs, report).await,
    }
}

fn load_config(path: Option<&Path>, server: Option<String>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    Ok(match server {
        Some(url) => config.with_server_url(url),
        None => config,
    })
}

fn image_source(args: &ImageArgs) -> Result<SourceRef> {
    let blob = match &args.file {
        Some(path) => Some(
            ImageBlob::from_path(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };
    let source = SourceRef::from_input(blob, args.url.as_deref());
    if source.is_none() {
        bail!(ClientError::NoSource);
    }
    Ok(source)
}

fn write_report(path: &Path, title: &str, fragments: &[String]) -> Result<()> {
    std::fs::write(path, report_page(title, fragments))?;
    info!("Report written to {}", path.display());
    Ok(())
}

async fn analyze_command(
    config: ClientConfig,
    image: ImageArgs,
    report: Option<PathBuf>,
) -> Result<()> {
    let mut session = EditSession::new(Arc::new(HttpService::new(config)));
    session.set_source(image_source(&image)?);

    let analysis = session.analyze().await?;
    match &analysis {
        analysis_client::CoverAnalysis::Placeholder { message } => {
            info!("Placeholder cover: {}", message);
        }
        analysis_client::CoverAnalysis::Full(features) => {
            info!(
                "Design: {} | face: {} | complexity: {} | contrast: {}",
                features.design, features.face, features.complexity, features.color_contrast
            );
        }
    }

    if let Some(path) = report {
        write_report(&path, "Cover analysis", &[render_analysis(&analysis)])?;
    }
    Ok(())
}

async fn edit_command(
    config: ClientConfig,
    image: ImageArgs,
    steps: Vec<EditStep>,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
) -> Result<()> {
    let default_tolerance = config.default_tolerance;
    let mut session = EditSession::new(Arc::new(HttpService::new(config)));
    session.set_source(image_source(&image)?);

    for (index, step) in steps.iter().enumerate() {
        info!("Step {}/{}: {:?}", index + 1, steps.len(), step);
        match step {
            EditStep::Filter(mode) => session.apply_filter(*mode).await?,
            EditStep::Color { x, y } => {
                let [a, b, c] = session.get_color(*x, *y).await?;
                info!("Color at ({}, {}): {}, {}, {}", x, y, a, b, c);
            }
            EditStep::Point { x, y, rgb } => session.replace_color_point(*x, *y, *rgb).await?,
            EditStep::Replace {
                target,
                new,
                tolerance,
            } => {
                pick(&mut session, ColorSlotKind::Target, *target).await?;
                pick(&mut session, ColorSlotKind::Replacement, *new).await?;
                session
                    .apply_color_replacement(tolerance.unwrap_or(default_tolerance))
                    .await?;
            }
        }
    }

    let Some(result) = session.preview() else {
        warn!("No edited image to save");
        return Ok(());
    };
    if let Some(path) = &output {
        std::fs::write(path, &result.bytes)?;
        info!("Saved {} to {}", result.file_name, path.display());
    }
    if let Some(path) = &report {
        let fragment = format!(
            "<div class=\"edit-result\"><img src=\"{}\" style=\"max-width:100%\"></div>",
            result.data_uri()
        );
        write_report(path, "Edited cover", &[fragment])?;
    }
    Ok(())
}

/// Pick a color at natural-size coordinates into `slot`.
async fn pick<S: AnalysisService>(
    session: &mut EditSession<S>,
    slot: ColorSlotKind,
    (x, y): (f64, f64),
) -> Result<()> {
    let (width, height) = session
        .preview()
        .and_then(|p| p.dimensions())
        .context("Color picking needs a decodable image (use --file or apply a filter first)")?;
    info!("{}", session.enable_picker(slot));
    let picked = session
        .handle_click(x, y, width as f64, height as f64)
        .await?;
    match picked {
        Some((slot, color)) => {
            info!("{:?} color: {} {:?}", slot, color.hex, color.rgb);
            Ok(())
        }
        None => bail!("No color picked at ({}, {})", x, y),
    }
}

async fn similar_command(
    config: ClientConfig,
    image: ImageArgs,
    top_n: Option<u32>,
    report: Option<PathBuf>,
) -> Result<()> {
    let top_n = top_n.unwrap_or(config.similarity_top_n);
    let mut session = EditSession::new(Arc::new(HttpService::new(config)));
    session.set_source(image_source(&image)?);

    let items = session.find_similar(top_n).await?;
    if items.is_empty() {
        info!("No similar covers found");
    }
    for (rank, item) in items.iter().enumerate() {
        info!("{}. {} ({:.3})", rank + 1, item.title, item.score);
    }

    if let Some(path) = report {
        write_report(&path, "Similar covers", &[render_similarity(&items)])?;
    }
    Ok(())
}

async fn stats_command(config: ClientConfig, refresh: bool, report: Option<PathBuf>) -> Result<()> {
    let service = HttpService::new(config);
    let stats = service.genre_stats(refresh).await?;

    info!(
        "{} covers: {} minimalistic, {} balanced, {} overloaded, {} with faces",
        stats.total_books,
        stats.minimalistic,
        stats.balanced(),
        stats.overloaded,
        stats.faces
    );
    if !stats.cache_info.is_empty() {
        info!("{}", stats.cache_info);
    }

    if let Some(path) = report {
        write_report(&path, "Dataset statistics", &[render_genre_stats(&stats)])?;
    }
    Ok(())
}

async fn skating_command(
    config: ClientConfig,
    file: Option<PathBuf>,
    youtube: Option<String>,
    raw_intervals: Vec<String>,
    timeout_secs: Option<u64>,
    report: Option<PathBuf>,
) -> Result<()> {
    for raw in &raw_intervals {
        if parse_interval(raw).is_none() {
            warn!("Skipping invalid interval: {}", raw);
        }
    }
    let intervals = collect_intervals(&raw_intervals);

    let blob = match &file {
        Some(path) => Some(
            ImageBlob::from_path(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };
    let source = SourceRef::from_input(blob, youtube.as_deref());

    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.video_timeout());
    let workflow = Arc::new(VideoWorkflow::new(
        Arc::new(HttpService::new(config)),
        timeout,
    ));

    let ctrl_c = {
        let workflow = workflow.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                workflow.cancel();
            }
        })
    };
    let result = workflow.submit(&source, &intervals).await;
    ctrl_c.abort();

    match result {
        Ok(analysis) => {
            info!(
                "Analyzed {} interval(s), {} jump result(s)",
                analysis.manual_jump_intervals.len(),
                analysis.jump_analysis.len()
            );
            if let Some(path) = report {
                write_report(&path, "Skating analysis", &[render_skating_report(&analysis)])?;
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::Discarded => {
            info!("Analysis cancelled");
            Ok(())
        }
        Err(e) => {
            if let (Some(path), Some(fragment)) = (&report, render_video_failure(&e)) {
                write_report(path, "Skating analysis", &[fragment])?;
            }
            Err(e.into())
        }
    }
}
