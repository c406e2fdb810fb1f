// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! Each command opens the catalog, does its work synchronously (capture
//! runs the async pipeline on a private runtime) and prints a short report.

use futures::future::join_all;
use photostudio::app::{EditorSession, Message, NotificationKind, ui_channel};
use photostudio::backends::camera::{FrameHandle, Rotation};
use photostudio::config::Config;
use photostudio::errors::{AppError, PreconditionViolation};
use photostudio::filter::{ColorAdjustment, Filter, FilterId, FilterTag};
use photostudio::persistence::{PersistenceGateway, SqliteStore};
use photostudio::pipelines::photo::CapturePipeline;
use photostudio::storage::{self, DiskStorage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved configuration plus the open catalog
pub struct Context {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub storage: Arc<DiskStorage>,
}

impl Context {
    pub fn open(
        config_path: Option<PathBuf>,
        db: Option<PathBuf>,
        photos_dir: Option<PathBuf>,
    ) -> Result<Self, AppError> {
        let mut config = match config_path {
            Some(path) => Config::load(&path),
            None => Config::load_default(),
        };
        if db.is_some() {
            config.database_path = db;
        }
        if photos_dir.is_some() {
            config.photos_dir = photos_dir;
        }

        let store = SqliteStore::open(&config.database_path()?)?;
        let storage = DiskStorage::new(config.photos_dir()?, config.photo_encoder());
        Ok(Self {
            config,
            store: Arc::new(store),
            storage: Arc::new(storage),
        })
    }

    fn editor(&self, id: i64) -> Result<EditorSession, AppError> {
        EditorSession::load(self.store.as_ref(), id)
    }
}

/// Run image files through the capture pipeline
///
/// All inputs are submitted before any is awaited, so they save and index
/// concurrently up to `max_concurrent_captures`.
pub fn capture(ctx: &Context, inputs: &[PathBuf], rotation: Rotation) -> CliResult {
    let rt = tokio::runtime::Runtime::new()?;
    let (ui, mut queue) = ui_channel();
    let pipeline = CapturePipeline::new(
        ctx.storage.clone(),
        ctx.store.clone(),
        ui,
        ctx.config.max_concurrent_captures,
        rt.handle().clone(),
    );

    let mut tasks = Vec::with_capacity(inputs.len());
    for (sequence, input) in inputs.iter().enumerate() {
        let image = storage::load_image_file(input)?
            .ok_or_else(|| format!("Input file not found: {}", input.display()))?;
        let frame = storage::image_to_frame(&image, sequence as u64);
        println!(
            "Capturing {} ({}x{}, {})",
            input.display(),
            frame.width,
            frame.height,
            rotation
        );
        tasks.push(pipeline.capture(FrameHandle::unmanaged(frame), rotation));
    }

    let outcomes = rt.block_on(join_all(tasks.into_iter().map(|task| task.wait())));

    while let Ok(message) = queue.try_recv() {
        if let Message::Notify(notification) = message {
            match notification.kind {
                NotificationKind::Info => println!("{}", notification.text),
                NotificationKind::Error => eprintln!("{}", notification.text),
            }
        }
    }

    let mut failed = 0;
    for (input, outcome) in inputs.iter().zip(outcomes) {
        match outcome {
            Ok(record) => println!("Saved #{}: {}", record.id, record.storage_path),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", input.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} capture(s) failed", inputs.len()).into());
    }
    Ok(())
}

/// Print every stored image, newest first
pub fn list_images(ctx: &Context) -> CliResult {
    let images = ctx.store.list_images()?;
    if images.is_empty() {
        println!("No images yet.");
        return Ok(());
    }

    for image in images {
        let filters = ctx.store.get_filter_records(image.id)?.len();
        println!(
            "  [{}] {}  {}  ({} filter{})",
            image.id,
            image.timestamp,
            image.storage_path,
            filters,
            if filters == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

/// Print an image's filter stack and composite transform
pub fn show_filters(ctx: &Context, id: i64) -> CliResult {
    let session = ctx.editor(id)?;
    let stack = session.stack();
    println!("Image #{}: {}", id, session.image().storage_path);

    if stack.is_empty() {
        println!("  (no filters)");
    }
    for (index, (_, filter)) in stack.iter().enumerate() {
        let params: Vec<String> = filter
            .describe_controls()
            .iter()
            .map(|c| format!("{}={:.3}", c.key, c.value))
            .collect();
        println!("  [{}] {} ({}) {}", index, filter.name(), filter.tag(), params.join(" "));
    }

    println!();
    println!("Composite:");
    print!("{}", stack.current_transform());
    Ok(())
}

pub fn add_filter(
    ctx: &Context,
    id: i64,
    kind: FilterTag,
    value: Option<f32>,
    name: Option<String>,
) -> CliResult {
    let mut session = ctx.editor(id)?;

    let mut filter = match &name {
        Some(name) => Filter::with_name(name.clone(), kind.default_kind()),
        None => Filter::new(kind.default_kind()),
    };
    if let Some(value) = value {
        let Some(control) = filter.describe_controls().into_iter().next() else {
            return Err(format!("{kind} has no adjustable parameter").into());
        };
        filter.set_control(control.key, value)?;
    }

    let filter_id = session.stack_mut().add(filter, name.is_none());
    session.save(ctx.store.as_ref())?;

    let added = session
        .stack()
        .get(filter_id)
        .map(|f| f.name().to_string())
        .unwrap_or_default();
    println!("Added '{}' to image #{} ({} filters)", added, id, session.stack().len());
    Ok(())
}

pub fn remove_filter(ctx: &Context, id: i64, index: usize) -> CliResult {
    let mut session = ctx.editor(id)?;
    let filter_id = filter_at(&session, index)?;
    let removed = session.stack_mut().remove(filter_id)?;
    session.save(ctx.store.as_ref())?;
    println!("Removed '{}' from image #{}", removed.name(), id);
    Ok(())
}

pub fn reset_filter(ctx: &Context, id: i64, index: usize) -> CliResult {
    let mut session = ctx.editor(id)?;
    let filter_id = filter_at(&session, index)?;
    session.stack_mut().reset(filter_id)?;
    session.save(ctx.store.as_ref())?;
    println!("Reset filter {} of image #{}", index, id);
    Ok(())
}

pub fn export(ctx: &Context, id: i64, output: &Path) -> CliResult {
    let session = ctx.editor(id)?;
    session.export(ctx.storage.as_ref(), output, ctx.config.jpeg_quality)?;
    println!(
        "Exported image #{} with {} filter(s) to {}",
        id,
        session.stack().len(),
        output.display()
    );
    Ok(())
}

fn filter_at(session: &EditorSession, index: usize) -> Result<FilterId, PreconditionViolation> {
    session
        .stack()
        .id_at(index)
        .ok_or(PreconditionViolation::IndexOutOfRange {
            index,
            len: session.stack().len(),
        })
}
