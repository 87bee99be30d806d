use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::io;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads a corpus file: one sentence per line, tokens separated by whitespace.
///
/// Blank lines are skipped. Tokens are kept as written (no case folding).
pub fn read_sentences<P: AsRef<Path>>(filename: P) -> io::Result<Vec<Vec<String>>> {
	Ok(read_file(filename)?
		.iter()
		.map(|line| line.split_whitespace().map(str::to_owned).collect::<Vec<_>>())
		.filter(|sentence| !sentence.is_empty())
		.collect())
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/train.txt"` → `"train"`
/// - `"train.txt"` → `"train"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_read_sentences_splits_and_skips_blank_lines() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "the cat  sat").unwrap();
		writeln!(file).unwrap();
		writeln!(file, "  the dog ran ").unwrap();

		let sentences = read_sentences(file.path()).unwrap();
		assert_eq!(sentences, vec![vec!["the", "cat", "sat"], vec!["the", "dog", "ran"]]);
	}

	#[test]
	fn test_read_sentences_missing_file() {
		assert!(read_sentences("/definitely/not/here.txt").is_err());
	}

	#[test]
	fn test_get_filename() {
		assert_eq!(get_filename("./data/train.txt").unwrap(), "train");
		assert_eq!(get_filename("train.txt").unwrap(), "train");
	}
}
