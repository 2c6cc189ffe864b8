use std::path::{Path, PathBuf};
use std::{fs, io};

/// Reads a whole text file into memory.
pub fn read_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/corpus.txt` + `"bin"` → `data/corpus.bin`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/en.json"` → `"en"`
/// - `"en.json"` → `"en"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists all files whose extension is one of `extensions`.
///
/// Returns sorted file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() {
			continue;
		}
		let matches = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| extensions.contains(&ext));
		if matches {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}
