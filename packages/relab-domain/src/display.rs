//! Formatting helpers shared by every renderer.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

const ELLIPSIS: &str = "...";

static MARK: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?is)<mark\b[^>]*>(.*?)</mark>").ok());
static TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").ok());

pub fn format_score(score: f64) -> String {
	format!("{score:.4}")
}

pub fn format_seconds(seconds: f64) -> String {
	format!("{seconds:.2}s")
}

pub fn format_millis(millis: f64) -> String {
	format!("{millis:.2}ms")
}

/// Cuts `text` to at most `max` grapheme clusters, appending an ellipsis when it had to cut.
pub fn truncate(text: &str, max: usize) -> Cow<'_, str> {
	let mut graphemes = text.grapheme_indices(true);

	match graphemes.nth(max) {
		None => Cow::Borrowed(text),
		Some((cut, _)) => Cow::Owned(format!("{}{ELLIPSIS}", text[..cut].trim_end())),
	}
}

/// Turns backend highlight markup into plain text. `<mark>` spans become `[term]`; any other
/// tag is dropped and the common entities are decoded.
pub fn strip_markup(html: &str) -> String {
	let marked = match MARK.as_ref() {
		Some(re) => re.replace_all(html, "[$1]"),
		None => Cow::Borrowed(html),
	};
	let plain = match TAG.as_ref() {
		Some(re) => re.replace_all(&marked, ""),
		None => Cow::Borrowed(marked.as_ref()),
	};

	plain
		.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&apos;", "'")
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&amp;", "&")
}
