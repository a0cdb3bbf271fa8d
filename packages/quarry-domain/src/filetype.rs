//! Logical file-type categories and the physical extensions behind them.
//!
//! Indexed documents carry their extension sometimes dotted (`.pdf`) and
//! sometimes bare (`pdf`); filters match both forms on purpose.

/// The pseudo-category matching every document whose extension is not in any
/// known category.
pub const OTHER: &str = "other";

const CATEGORIES: &[(&str, &[&str])] = &[
	("pdf", &["pdf"]),
	("word", &["doc", "docx"]),
	("excel", &["xls", "xlsx", "xlsm"]),
	("powerpoint", &["ppt", "pptx"]),
	("image", &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"]),
	("text", &["txt", "csv", "md", "log"]),
	("archive", &["zip", "rar", "7z", "tar", "gz"]),
	("docuworks", &["xdw", "xbd"]),
];

/// Extensions for one logical category, `None` for unknown categories and
/// for [`OTHER`].
pub fn extensions(category: &str) -> Option<&'static [&'static str]> {
	CATEGORIES
		.iter()
		.find(|(name, _)| name.eq_ignore_ascii_case(category))
		.map(|(_, extensions)| *extensions)
}

/// Every extension claimed by any known category.
pub fn all_known_extensions() -> Vec<&'static str> {
	CATEGORIES.iter().flat_map(|(_, extensions)| extensions.iter().copied()).collect()
}

/// Both index forms of each extension, bare first then dotted.
pub fn match_terms<'a>(extensions: impl IntoIterator<Item = &'a str>) -> Vec<String> {
	let mut out = Vec::new();

	for extension in extensions {
		out.push(extension.to_string());
		out.push(format!(".{extension}"));
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_categories_resolve_case_insensitively() {
		assert_eq!(extensions("pdf"), Some(["pdf"].as_slice()));
		assert_eq!(extensions("Excel"), Some(["xls", "xlsx", "xlsm"].as_slice()));
		assert_eq!(extensions("other"), None);
		assert_eq!(extensions("unknown"), None);
	}

	#[test]
	fn match_terms_cover_dotted_and_bare_forms() {
		let terms = match_terms(["pdf", "docx"]);

		assert_eq!(terms, vec!["pdf", ".pdf", "docx", ".docx"]);
	}

	#[test]
	fn all_known_extensions_include_every_category() {
		let all = all_known_extensions();

		assert!(all.contains(&"pdf"));
		assert!(all.contains(&"xdw"));
		assert_eq!(all.len(), CATEGORIES.iter().map(|(_, exts)| exts.len()).sum::<usize>());
	}
}
