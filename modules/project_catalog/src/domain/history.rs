//! Project update-and-history workflow
//!
//! Every update event snapshots the pre-update `modified_at`, `data` and
//! `thumbnail` into the history arrays before the requested changes are
//! applied. Values are logged whether or not the update touches them.

use crate::contract::{Project, ProjectChanges};
use chrono::{DateTime, Utc};

/// Apply one update event to `project`
///
/// Callers run this inside the same transaction that persists the result so
/// history never runs ahead of or behind the stored fields.
pub fn apply_update(project: &mut Project, changes: ProjectChanges, now: DateTime<Utc>) {
    project.modified_date_history.push(project.modified_at);
    project.modified_data_history.push(project.data.clone());
    project
        .modified_thumbnail_history
        .push(project.thumbnail.clone());

    if let Some(title) = changes.title {
        project.title = title;
    }
    if let Some(application_id) = changes.application_id {
        project.application_id = application_id;
    }
    if let Some(tool_id) = changes.tool_id {
        project.tool_id = tool_id;
    }
    if let Some(mut tag_ids) = changes.tag_ids {
        tag_ids.sort_unstable();
        tag_ids.dedup();
        project.tag_ids = tag_ids;
    }
    if let Some(data) = changes.data {
        project.data = data;
    }
    if let Some(thumbnail) = changes.thumbnail {
        project.thumbnail = thumbnail;
    }
    if let Some(description) = changes.description {
        project.description = description;
    }

    project.modified_at = now;
}
