//! Response Mapper
//!
//! Decides how script output is delivered (photo, video or text) by sniffing
//! its leading bytes, and formats the user-visible reply texts.

use image::ImageFormat;

use super::script_runner::ScriptError;
use super::types::MESSAGE_UNKNOWN_COMMAND;

/// Only this many leading bytes are inspected.
pub const SNIFF_LEN: usize = 512;

/// Delivery form chosen for script output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// image/* content, sent as a photo
    Image(&'static str),
    /// video/* content, sent as a video
    Video(&'static str),
    /// Anything else, sent as text
    Text,
}

impl ResponseKind {
    pub fn mime(&self) -> &'static str {
        match self {
            ResponseKind::Image(mime) | ResponseKind::Video(mime) => *mime,
            ResponseKind::Text => "text/plain",
        }
    }
}

/// Response formatter for remote platform display.
pub struct ResponseMapper;

impl ResponseMapper {
    /// Classify output bytes by content signature.
    pub fn classify(bytes: &[u8]) -> ResponseKind {
        let head = &bytes[..bytes.len().min(SNIFF_LEN)];

        if let Some(mime) = Self::sniff_image(head) {
            return ResponseKind::Image(mime);
        }
        if let Some(mime) = Self::sniff_video(head) {
            return ResponseKind::Video(mime);
        }
        ResponseKind::Text
    }

    /// Image formats a chat client renders as a photo.
    fn sniff_image(head: &[u8]) -> Option<&'static str> {
        match image::guess_format(head).ok()? {
            format @ (ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::WebP
            | ImageFormat::Bmp
            | ImageFormat::Ico) => Some(format.to_mime_type()),
            _ => None,
        }
    }

    fn sniff_video(head: &[u8]) -> Option<&'static str> {
        if head.starts_with(b"\x1A\x45\xDF\xA3") {
            return Some("video/webm");
        }
        if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"AVI " {
            return Some("video/avi");
        }
        if Self::is_mp4(head) {
            return Some("video/mp4");
        }
        None
    }

    /// ISO base media file with an `ftyp` box naming an `mp4*` brand.
    fn is_mp4(head: &[u8]) -> bool {
        if head.len() < 12 {
            return false;
        }
        let box_size = u32::from_be_bytes([head[0], head[1], head[2], head[3]]) as usize;
        if box_size < 12 || head.len() < box_size || box_size % 4 != 0 {
            return false;
        }
        if &head[4..8] != b"ftyp" {
            return false;
        }
        // Major brand at 8, minor version at 12, compatible brands from 16.
        (8..box_size)
            .step_by(4)
            .filter(|&offset| offset != 12)
            .any(|offset| &head[offset..offset + 3] == b"mp4")
    }

    /// Reply to a message that is not a known command.
    pub fn format_unknown_command(text: &str) -> String {
        if text.is_empty() {
            MESSAGE_UNKNOWN_COMMAND.to_string()
        } else {
            format!("{}: {}", text, MESSAGE_UNKNOWN_COMMAND)
        }
    }

    /// Reply used when the script source cannot be read.
    pub fn format_read_error(error: &std::io::Error) -> String {
        format!("Error: {}", error)
    }

    /// Reply for a failed script run, including whatever it printed.
    pub fn format_script_error(error: &ScriptError, output: &[u8]) -> String {
        format!(
            "Error running script: {} ({})",
            error,
            String::from_utf8_lossy(output)
        )
    }

    /// Fallback text when a media upload is rejected.
    pub fn format_media_failure(kind: ResponseKind, error: &impl std::fmt::Display) -> String {
        let noun = match kind {
            ResponseKind::Image(_) => "photo",
            ResponseKind::Video(_) => "video",
            ResponseKind::Text => "message",
        };
        format!("Failed to send {}: {}", noun, error)
    }

    /// Script output rendered as text.
    pub fn format_text_output(output: &[u8]) -> String {
        String::from_utf8_lossy(output).into_owned()
    }
}
