//! Writing exported calendars to disk and handing them off.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::constants::ICS_MIME_TYPE;
use crate::error::{DaybookError, DaybookResult};
use crate::event::Event;
use crate::ics;

const EXPORT_PREFIX: &str = "daybook-export";
const MAX_COLLISIONS: usize = 100;

/// A calendar file that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub mime_type: &'static str,
}

/// Something that can receive an exported file: an OS share sheet, a file
/// opener, or just a printer of paths.
pub trait ShareTarget {
    fn share(&self, file: &ExportedFile) -> DaybookResult<()>;
}

/// `daybook-export-YYYYMMDDTHHMMSSZ.ics`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("{EXPORT_PREFIX}-{}.ics", now.format("%Y%m%dT%H%M%SZ"))
}

/// Serialize `entities` and write them to a fresh file in `dir`.
///
/// The file name is timestamped; if a file with that name already exists
/// (two exports within the same second) a `-N` suffix is appended.
pub async fn export_to_dir<'a, I>(entities: I, dir: &Path) -> DaybookResult<ExportedFile>
where
    I: IntoIterator<Item = &'a Event>,
{
    let now = Utc::now();
    let text = ics::serialize_at(entities, now);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DaybookError::Export(format!("create {}: {e}", dir.display())))?;

    let base = export_file_name(now);
    let stem = base.trim_end_matches(".ics");

    for n in 1..=MAX_COLLISIONS {
        let name = if n == 1 {
            base.clone()
        } else {
            format!("{stem}-{n}.ics")
        };
        let path = dir.join(name);

        let file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(DaybookError::Export(format!("open {}: {e}", path.display())));
            }
        };

        write_or_discard(file, &path, &text).await?;

        tracing::debug!(path = %path.display(), bytes = text.len(), "exported calendar");
        return Ok(ExportedFile {
            path,
            mime_type: ICS_MIME_TYPE,
        });
    }

    Err(DaybookError::Export(format!(
        "Too many export files named '{base}' in {}",
        dir.display()
    )))
}

/// Write `text` to a file just created at `path`. On failure the partial
/// file is removed so no truncated calendar is left behind.
async fn write_or_discard<W>(mut file: W, path: &Path, text: &str) -> DaybookResult<()>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(text.as_bytes()).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    let Err(e) = written else {
        return Ok(());
    };

    drop(file);
    if let Err(remove_err) = tokio::fs::remove_file(path).await {
        tracing::warn!(
            path = %path.display(),
            error = %remove_err,
            "could not remove partial export"
        );
    }
    Err(DaybookError::Export(format!("write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, Kind};
    use chrono::{NaiveDate, TimeZone};
    use std::pin::Pin;
    use std::task::{Context, Poll};

    fn holiday() -> Event {
        let d = |day| EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, day).unwrap());
        Event::new(Kind::Event, d(10), d(12), "Holiday", "Sam")
    }

    #[test]
    fn file_name_is_timestamped() {
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(export_file_name(now), "daybook-export-20250304T050607Z.ics");
    }

    #[tokio::test]
    async fn writes_serialized_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let events = [holiday()];

        let exported = export_to_dir(&events, &dir.path().join("out")).await.unwrap();

        assert_eq!(exported.mime_type, "text/calendar");
        let text = tokio::fs::read_to_string(&exported.path).await.unwrap();
        assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(text.contains("DTSTART;VALUE=DATE:20250110\r\n"));
        assert!(text.ends_with("END:VCALENDAR"));
    }

    #[tokio::test]
    async fn concurrent_exports_write_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let events = [holiday()];

        let (a, b) = tokio::join!(
            export_to_dir(&events, dir.path()),
            export_to_dir(&events, dir.path())
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.path, b.path);
        assert!(a.path.exists());
        assert!(b.path.exists());
    }

    #[tokio::test]
    async fn unwritable_directory_is_an_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = export_to_dir(&[holiday()], &blocker.join("sub")).await.unwrap_err();
        assert!(matches!(err, DaybookError::Export(_)));
    }

    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::other("no space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_write_removes_the_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name(Utc::now()));
        std::fs::write(&path, "BEGIN:VCAL").unwrap();

        let err = write_or_discard(FullDisk, &path, "BEGIN:VCALENDAR").await.unwrap_err();

        assert!(matches!(err, DaybookError::Export(_)));
        assert!(!path.exists());
    }
}
