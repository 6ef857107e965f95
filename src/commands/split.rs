use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::SplitArgs;
use crate::commands::load_source;
use crate::model::{EntryId, PartRecord, SplitManifest};
use crate::package::{MERGED_FILENAME, bundle, render_outputs, write_outputs};
use crate::pdf::LopdfDocument;
use crate::session::Session;
use crate::util::{now_utc_string, write_bytes, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;
const DEFAULT_OUT_DIR: &str = "split_output";
pub const MANIFEST_FILENAME: &str = "split_manifest.json";

pub fn run(args: SplitArgs, timeout: Duration) -> Result<()> {
    let mut loaded = load_source(&args.input, timeout)?;
    let session = &mut loaded.session;

    if session.toc().is_none() {
        warn!(source = %session.name(), "no table of contents found; nothing to split");
        return Ok(());
    }

    apply_selection(session, &args)?;

    let mut parts = session.extract().context("failed to extract selected entries")?;
    if parts.is_empty() {
        warn!(source = %session.name(), "empty selection; nothing written");
        return Ok(());
    }

    let records = parts
        .iter()
        .map(|part| part.record())
        .collect::<Result<Vec<PartRecord>, _>>()
        .context("failed to measure extracted parts")?;

    let out_dir = output_dir(&args);
    if let Some(dir) = &out_dir {
        if let Some(files) = render_outputs(&mut parts).context("failed to render output documents")? {
            write_outputs(dir, &files)
                .with_context(|| format!("failed to write parts to {}", dir.display()))?;
        }

        let manifest = SplitManifest {
            manifest_version: MANIFEST_VERSION,
            generated_at: now_utc_string(),
            source: session.name().to_string(),
            source_sha256: loaded.sha256.clone(),
            merged_filename: Some(MERGED_FILENAME.to_string()),
            part_count: records.len(),
            parts: records.clone(),
        };
        write_json_pretty(&dir.join(MANIFEST_FILENAME), &manifest)?;
    }

    if let Some(path) = &args.archive {
        if let Some(bytes) = bundle(&mut parts).context("failed to build archive")? {
            write_bytes(path, &bytes)?;
            info!(path = %path.display(), bytes = bytes.len(), "wrote archive");
        }
    }

    info!(
        source = %session.name(),
        parts = records.len(),
        out_dir = %out_dir.as_ref().map(|dir| dir.display().to_string()).unwrap_or_default(),
        "split complete"
    );
    Ok(())
}

fn apply_selection(session: &mut Session<LopdfDocument>, args: &SplitArgs) -> Result<()> {
    if args.all {
        session.select_all(true);
        return Ok(());
    }

    for id in args.entries.iter().copied().map(EntryId) {
        let checked = session
            .selection()
            .is_checked(id)
            .with_context(|| format!("failed to select entry {id}"))?;
        if checked {
            debug!(entry = %id, "already selected through its section");
            continue;
        }
        session
            .toggle(id, true)
            .with_context(|| format!("failed to select entry {id}"))?;
    }
    Ok(())
}

// An archive-only run writes no directory.
fn output_dir(args: &SplitArgs) -> Option<PathBuf> {
    match (&args.out_dir, &args.archive) {
        (Some(dir), _) => Some(dir.clone()),
        (None, None) => Some(PathBuf::from(DEFAULT_OUT_DIR)),
        (None, Some(_)) => None,
    }
}
