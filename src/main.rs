use std::future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cardvision::commands::Command;
use cardvision::database;
use cardvision::features::load_signature;
use cardvision::modules::input::{CameraInput, StillInput};
use cardvision::modules::output::JpegOutput;
use cardvision::modules::{FrameSource, OutputModule};
use cardvision::{Config, IdentifyOutcome, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "cardvision", about = "Identify cards held up to a camera")]
struct Args {
	#[arg(long, default_value = "cardvision.toml")]
	config: PathBuf,
	/// Analyse a still image instead of the camera
	#[arg(long, value_name = "PATH")]
	image: Option<PathBuf>,
	/// Do not write the MJPEG preview to stdout
	#[arg(long)]
	no_preview: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(io::stderr)
		.init();

	let args = Args::parse();
	let config = Config::from_file(&args.config).with_context(|| format!("loading {}", args.config.display()))?;

	let source: Box<dyn FrameSource> = match &args.image {
		Some(path) => Box::new(StillInput::from_file(path)?),
		None => Box::new(CameraInput::open(&config.input)?),
	};
	let mut pipeline = Pipeline::new(config.clone(), source)?;

	let features = config.features.clone();
	let sources = config.database.resolved_sources();
	info!(identities = sources.len(), "building reference database");
	let mut database_task = Some(tokio::spawn(database::build(sources, move |path: &Path| {
		load_signature(path, &features)
	})));
	let mut identify_task: Option<JoinHandle<cardvision::Result<IdentifyOutcome>>> = None;

	let mut output = (!args.no_preview).then(|| JpegOutput::new(io::stdout()));
	let mut commands = BufReader::new(tokio::io::stdin()).lines();
	let mut stdin_open = true;

	let mut ticker = time::interval(config.tick_period());
	ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

	loop {
		tokio::select! {
			_ = ticker.tick() => {
				let report = pipeline.tick(Instant::now());
				let published = match (output.as_mut(), pipeline.last_frame()) {
					(Some(output), Some(frame)) => output.publish(frame, report.quad.as_ref()),
					_ => Ok(()),
				};
				if let Err(err) = published {
					warn!(error = %err, "preview output failed, disabling it");
					output = None;
				}
			}
			Some(joined) = join_pending(&mut database_task) => {
				database_task = None;
				let (database, report) = joined.context("reference database build task")?;
				info!(
					success_count = report.success_count,
					total_count = report.total_count,
					ratio = report.success_ratio(),
					"reference database ready"
				);
				pipeline.attach_database(database);
			}
			Some(joined) = join_pending(&mut identify_task) => {
				identify_task = None;
				match joined {
					Ok(Ok(outcome)) => {
						if pipeline.finish_capture(outcome) {
							log_candidates(&pipeline);
						}
					}
					Ok(Err(err)) => warn!(error = %err, "identification failed"),
					Err(err) => warn!(error = %err, "identification task did not complete"),
				}
			}
			line = commands.next_line(), if stdin_open => {
				let Some(line) = line.context("reading commands")? else {
					stdin_open = false;
					continue;
				};
				match line.parse::<Command>() {
					Ok(Command::Capture) => match pipeline.begin_capture(Instant::now()) {
						Ok(job) => identify_task = Some(tokio::task::spawn_blocking(move || job.run())),
						Err(err) => warn!(error = %err, "capture refused"),
					},
					Ok(Command::Exclude(name)) => {
						pipeline.exclude(&name);
						log_candidates(&pipeline);
					}
					Ok(Command::Reset) => {
						pipeline.reset();
						info!("session reset");
					}
					Ok(Command::Status) => {
						let status = pipeline.status(Instant::now());
						info!(
							vision_ready = status.vision_ready,
							database_ready = status.database_ready,
							analyzing = status.is_analyzing,
							quad = status.quad.is_some(),
							crop = status.crop_available,
							candidates = status.candidates.len(),
							"status"
						);
					}
					Ok(Command::Quit) => break,
					Err(err) => warn!(error = %err, "ignoring input"),
				}
			}
		}
	}

	pipeline.teardown();
	Ok(())
}

/// Resolves with the task's result, or never if there is no task.
async fn join_pending<T>(task: &mut Option<JoinHandle<T>>) -> Option<Result<T, JoinError>> {
	match task {
		Some(handle) => Some(handle.await),
		None => future::pending().await,
	}
}

fn log_candidates<S: FrameSource>(pipeline: &Pipeline<S>) {
	for (rank, candidate) in pipeline.candidates().iter().take(5).enumerate() {
		info!(rank = rank + 1, name = %candidate.display_name, score = candidate.score, "candidate");
	}
}
