/// Reserved answer meaning "nothing relevant was found". Compared by value, never displayed as
/// ordinary text.
pub const NO_DATA_FOUND: &str = "No Data Found";

pub fn is_sentinel(text: &str) -> bool {
	let trimmed = text.trim();
	let unquoted = trimmed
		.strip_prefix('"')
		.and_then(|inner| inner.strip_suffix('"'))
		.unwrap_or(trimmed)
		.trim();

	unquoted.eq_ignore_ascii_case(NO_DATA_FOUND)
}

pub fn sentinel() -> String {
	NO_DATA_FOUND.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn matches_regardless_of_case_and_quotes() {
		assert!(is_sentinel("No Data Found"));
		assert!(is_sentinel("no data found"));
		assert!(is_sentinel("  \"NO DATA FOUND\"\n"));
		assert!(!is_sentinel("No Data Found in section 3"));
		assert!(!is_sentinel(""));
	}
}
