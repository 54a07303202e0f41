//! File naming and delivery of export payloads.

use std::path::PathBuf;

use time::{macros::format_description, OffsetDateTime};

use super::error::ExportError;

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the browser's download machinery.
    Browser,
    /// Written to the local exports directory.
    Disk(PathBuf),
}

impl Delivery {
    pub fn describe(&self) -> String {
        match self {
            Delivery::Browser => "download started".to_string(),
            Delivery::Disk(path) => path.to_string_lossy().to_string(),
        }
    }
}

/// Replace every run of characters that are not ASCII letters, digits or
/// spaces with a single `-`.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == ' ' {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out
}

/// UTC timestamp with millisecond precision, e.g. `2024-05-01T09:30:00.123Z`.
pub fn iso_timestamp(at: OffsetDateTime) -> String {
    at.format(&format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
    .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

pub fn file_name_at(name: &str, extension: &str, at: OffsetDateTime) -> String {
    format!("{}-{}.{extension}", sanitize_name(name), iso_timestamp(at))
}

/// `<sanitized-name>-<timestamp>.<extension>` for the current instant.
pub fn export_file_name(name: &str, extension: &str) -> String {
    file_name_at(name, extension, OffsetDateTime::now_utc())
}

pub fn download_bytes(filename: &str, mime: &str, bytes: Vec<u8>) -> Result<Delivery, ExportError> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let fail = |message: &str| ExportError::delivery(filename, message);

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| fail("failed to create blob"))?;
        let url =
            Url::create_object_url_with_blob(&blob).map_err(|_| fail("unable to create download"))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| fail("document unavailable"))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| fail("unable to create anchor"))?
            .dyn_into()
            .map_err(|_| fail("anchor cast failed"))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or_else(|| fail("missing body"))?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(Delivery::Browser)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = mime;
        let dir = desktop_export_dir()
            .ok_or_else(|| ExportError::delivery(filename, "unable to determine export directory"))?;
        write_into(&dir, filename, &bytes).map(Delivery::Disk)
    }
}

/// Browser download names keep the ISO timestamp; on disk the colons become
/// dashes, since NTFS rejects `:` in file names.
#[cfg(not(target_arch = "wasm32"))]
fn disk_file_name(filename: &str) -> String {
    filename.replace(':', "-")
}

#[cfg(not(target_arch = "wasm32"))]
fn write_into(dir: &std::path::Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    use std::fs;
    use std::io::Write;

    fs::create_dir_all(dir)?;
    let path = dir.join(disk_file_name(filename));
    let mut file = fs::File::create(&path)?;
    file.write_all(bytes)?;
    Ok(path)
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("KPICARD_EXPORT_DIR") {
        return Some(PathBuf::from(dir));
    }
    let dirs = directories::ProjectDirs::from("com", "Kpicard", "Kpicard")?;
    Some(dirs.data_dir().join("exports"))
}
