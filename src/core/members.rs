//! Membership enumeration.

use chrono::Local;
use tracing::{error, info};

use crate::client::TelegramApi;
use crate::error::{Result, SpyderError};
use crate::message::Entity;
use crate::progress::{Progress, ProgressCallback};

use super::output::{CsvSink, OutputLayout, SinkSummary};
use super::records::ParticipantRecord;

/// Writes a snapshot of the entity's participants to the members sink.
///
/// The participant list is fetched in a single call. If that call fails the
/// enumeration is aborted and the members file keeps only its header row.
pub fn enumerate_members(
    client: &dyn TelegramApi,
    entity: &Entity,
    layout: &OutputLayout,
    progress: &ProgressCallback,
) -> Result<SinkSummary> {
    let name = layout.file_name_part(&entity.output_name());
    info!(entity = %name, "downloading members list");

    let mut sink = CsvSink::<ParticipantRecord>::create(layout, &name, Local::now())?;

    let participants = match client.list_participants(entity) {
        Ok(participants) => participants,
        Err(e) => {
            error!(entity = %name, error = %e, "unable to retrieve member list");
            sink.finish()?;
            return Err(SpyderError::remote("listing members of", name, e));
        }
    };

    let total = participants.len();
    for (done, user) in participants.iter().enumerate() {
        sink.write(&ParticipantRecord::from(user))?;
        progress(Progress::items(done + 1, total));
    }

    let summary = sink.finish()?;
    info!(path = %summary.path.display(), rows = summary.rows, "members list saved");
    Ok(summary)
}
