//! Template rendering
//!
//! Each template group pairs a glob pattern with a source base
//! directory and a destination directory. Matched files are rendered
//! strictly sequentially; the `sha` and `file` helpers available to a
//! template resolve paths against the base directory of the group the
//! template was matched in, captured per render invocation so no state
//! leaks across groups.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};
use sha2::{Digest, Sha384};
use tracing::debug;

use crate::config::TemplateGroup;
use crate::context::TemplateParams;
use crate::error::TemplateError;

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Render all groups in order, returning the written output paths
///
/// Matches within a group come back in the `glob` crate's order,
/// alphabetical within each directory. A pattern with no matches (or
/// pointing at files that have since disappeared) renders nothing and
/// is not an error.
pub fn render_groups(groups: &[TemplateGroup], params: &TemplateParams) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for group in groups {
        let base = Path::new(&group.cwd);
        let dest = Path::new(&group.dest);

        for rel in expand_group(group)? {
            written.push(render_file(base, &rel, dest, params)?);
        }
    }

    Ok(written)
}

/// Expand a group's glob pattern to relative file paths
pub fn expand_group(group: &TemplateGroup) -> Result<Vec<PathBuf>> {
    let base = Path::new(&group.cwd);
    let pattern = base.join(&group.src);
    let pattern = pattern.to_string_lossy();

    let entries = glob::glob(&pattern).map_err(|e| TemplateError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        // Unreadable entries count as no match
        let Ok(path) = entry else { continue };
        if !path.is_file() {
            continue;
        }
        let rel = path.strip_prefix(base).unwrap_or(&path).to_path_buf();
        matches.push(rel);
    }

    Ok(matches)
}

/// Render a single file from `base/rel` into `dest/rel`
fn render_file(
    base: &Path,
    rel: &Path,
    dest: &Path,
    params: &TemplateParams,
) -> Result<PathBuf> {
    let source = base.join(rel);
    let content = std::fs::read_to_string(&source)?;

    let rendered = renderer_for(base)
        .render_template(&content, params)
        .map_err(|e| TemplateError::RenderFailed {
            path: source.clone(),
            reason: e.to_string(),
        })?;

    let out_path = dest.join(rel);
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TemplateError::WriteFailed {
            path: out_path.clone(),
            reason: e.to_string(),
        })?;
    }
    std::fs::write(&out_path, rendered).map_err(|e| TemplateError::WriteFailed {
        path: out_path.clone(),
        reason: e.to_string(),
    })?;

    debug!(source = %source.display(), output = %out_path.display(), "rendered template");
    Ok(out_path)
}

/// Build a registry whose helpers resolve paths against `base`
fn renderer_for(base: &Path) -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);

    let sha_base = base.to_path_buf();
    registry.register_helper(
        "sha",
        Box::new(
            move |h: &Helper,
                  _: &Handlebars,
                  _: &Context,
                  _: &mut RenderContext,
                  out: &mut dyn Output|
                  -> HelperResult {
                let path = sha_base.join(helper_path(h, "sha")?);
                let bytes = std::fs::read(&path).map_err(|e| {
                    RenderErrorReason::Other(format!("sha: cannot read {}: {}", path.display(), e))
                })?;
                out.write(&ssri_digest(&bytes))?;
                Ok(())
            },
        ),
    );

    let file_base = base.to_path_buf();
    registry.register_helper(
        "file",
        Box::new(
            move |h: &Helper,
                  _: &Handlebars,
                  _: &Context,
                  _: &mut RenderContext,
                  out: &mut dyn Output|
                  -> HelperResult {
                let path = file_base.join(helper_path(h, "file")?);
                let text = std::fs::read_to_string(&path).map_err(|e| {
                    RenderErrorReason::Other(format!(
                        "file: cannot read {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                out.write(&text)?;
                Ok(())
            },
        ),
    );

    registry
}

fn helper_path(h: &Helper, name: &'static str) -> std::result::Result<String, RenderErrorReason> {
    h.param(0)
        .and_then(|p| p.value().as_str())
        .map(|s| s.to_string())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(name, 0))
}

/// Subresource-integrity digest of a byte slice (`sha384-<base64>`)
pub fn ssri_digest(bytes: &[u8]) -> String {
    let digest = Sha384::digest(bytes);
    format!("sha384-{}", BASE64.encode(digest))
}
