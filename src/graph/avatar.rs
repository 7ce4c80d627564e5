//! Placeholder avatars for entities without an image.

/// Fill colors for generated avatars, indexed by a hash of the display name.
pub const PLACEHOLDER_PALETTE: &[&str] = &[
	"#1976d2", "#7b1fa2", "#e65100", "#2e7d32", "#c62828", "#00838f", "#455a64", "#ad1457",
];

/// Deterministic placeholder color: sum of the name's char codes modulo the
/// palette length.
pub fn placeholder_color(name: &str) -> &'static str {
	let hash = name
		.chars()
		.fold(0usize, |acc, c| acc.wrapping_add(c as usize));
	PLACEHOLDER_PALETTE[hash % PLACEHOLDER_PALETTE.len()]
}

/// First letter of up to the first two whitespace-delimited words, upper-cased.
pub fn initials(name: &str) -> String {
	name.split_whitespace()
		.take(2)
		.filter_map(|word| word.chars().next())
		.flat_map(char::to_uppercase)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn initials_use_first_two_words() {
		assert_eq!(initials("alice van der berg"), "AV");
		assert_eq!(initials("Bob"), "B");
		assert_eq!(initials("  carol   smith "), "CS");
		assert_eq!(initials(""), "");
	}

	#[test]
	fn placeholder_color_is_stable_per_name() {
		assert_eq!(placeholder_color("Alice"), placeholder_color("Alice"));
		// 'A'(65) + 'l'(108) + 'i'(105) + 'c'(99) + 'e'(101) = 478, 478 % 8 = 6
		assert_eq!(placeholder_color("Alice"), PLACEHOLDER_PALETTE[6]);
		assert_eq!(placeholder_color(""), PLACEHOLDER_PALETTE[0]);
	}
}
