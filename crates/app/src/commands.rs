//! The `compress`, `decompress` and `codes` subcommands.

use std::fs;
use std::path::Path;

use huffcode_core::bitio::BitReader;
use huffcode_core::decode::{decode, ByteSink};
use huffcode_core::{format, CodeTable, CodeTree, FrequencyTable};
use tracing::{debug, info, instrument};

use crate::config::{output_paths, Input};
use crate::container::{parse_container, serialize_container};
use crate::encoder::encode_bytes;
use crate::error::{AppError, Result};
use crate::input_gen;
use crate::metrics::Metrics;

/// Stem used for outputs of a generated sample.
const SAMPLE_STEM: &str = "sample";

/// Compress `input` into `<stem>.code` and `<stem>.short` under `out_dir`.
#[instrument(level = "info", skip_all)]
pub fn compress(input: &Input, out_dir: &Path) -> Result<Metrics> {
    let mut metrics = Metrics::new();
    fs::create_dir_all(out_dir).map_err(|e| AppError::io(out_dir, e))?;

    let (data, stem) = match input {
        Input::File(path) => {
            let data = fs::read(path).map_err(|e| AppError::io(path, e))?;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| AppError::Config(format!("no file name in {}", path.display())))?;
            (data, stem)
        }
        Input::Sample { seed, size_bytes } => {
            let path = out_dir.join(format!("{SAMPLE_STEM}.txt"));
            let data = input_gen::write_sample_file(&path, *seed, *size_bytes)
                .map_err(|e| AppError::io(&path, e))?;
            info!(path = %path.display(), seed, "wrote sample input");
            (data, SAMPLE_STEM.to_string())
        }
    };
    metrics.raw_bytes = data.len() as u64;

    let tree = CodeTree::from_table(&FrequencyTable::from_bytes(&data))?;
    metrics.distinct_symbols = tree.leaf_count() as u64;
    metrics.tree_depth = tree.depth() as u64;

    let (code_path, short_path) = output_paths(out_dir, &stem);

    let mut tree_text = Vec::new();
    format::write_tree(&tree, &mut tree_text)?;
    fs::write(&code_path, &tree_text).map_err(|e| AppError::io(&code_path, e))?;
    metrics.tree_bytes = tree_text.len() as u64;

    let encoded = encode_bytes(&tree, &data)?;
    let container = serialize_container(encoded.bit_len, &encoded.payload);
    fs::write(&short_path, &container).map_err(|e| AppError::io(&short_path, e))?;
    metrics.encoded_bits = encoded.bit_len;
    metrics.container_bytes = container.len() as u64;

    info!(
        code = %code_path.display(),
        short = %short_path.display(),
        "compressed"
    );
    metrics.complete();
    Ok(metrics)
}

/// Rebuild the original bytes from a tree file and a container file.
#[instrument(level = "info", skip_all)]
pub fn decompress(code_file: &Path, short_file: &Path, output_file: &Path) -> Result<Metrics> {
    let mut metrics = Metrics::new();

    let tree_text = fs::read(code_file).map_err(|e| AppError::io(code_file, e))?;
    let tree = format::read_tree(tree_text.as_slice())?;
    metrics.tree_bytes = tree_text.len() as u64;
    metrics.distinct_symbols = tree.leaf_count() as u64;
    metrics.tree_depth = tree.depth() as u64;

    let bytes = fs::read(short_file).map_err(|e| AppError::io(short_file, e))?;
    let container = parse_container(&bytes)?;
    metrics.container_bytes = bytes.len() as u64;
    metrics.encoded_bits = container.bit_len;
    debug!(bit_len = container.bit_len, crc32 = container.crc32, "container verified");

    // parse_container checked the payload holds exactly bit_len bits
    let mut reader = BitReader::with_bit_len(&container.payload, container.bit_len as usize)?;

    // the output file is only created once the whole stream decoded
    let mut sink = ByteSink::new(Vec::new());
    decode(&tree, &mut reader, &mut sink)?;
    metrics.raw_bytes = sink.written();
    let decoded = sink.into_inner()?;
    fs::write(output_file, &decoded).map_err(|e| AppError::io(output_file, e))?;

    info!(output = %output_file.display(), bytes = metrics.raw_bytes, "decompressed");
    metrics.complete();
    Ok(metrics)
}

/// Print the code of every byte in `input_file` with its count.
pub fn print_codes(input_file: &Path) -> Result<()> {
    let data = fs::read(input_file).map_err(|e| AppError::io(input_file, e))?;
    let counts = FrequencyTable::from_bytes(&data);
    let tree = CodeTree::from_table(&counts)?;
    let codes = tree.code_table();

    for row in code_rows(&counts, &codes) {
        println!("{row}");
    }
    println!();
    println!("Encoded length: {} bits", encoded_length(&counts, &codes));
    Ok(())
}

fn code_rows(counts: &FrequencyTable, codes: &CodeTable) -> Vec<String> {
    let mut rows = vec![format!("{:>6}  {:>6}  {:>10}  code", "symbol", "char", "count")];
    for (symbol, code) in codes.iter() {
        let shown = char::from_u32(symbol)
            .map(|c| c.escape_default().to_string())
            .unwrap_or_default();
        rows.push(format!(
            "{:>6}  {:>6}  {:>10}  {}",
            symbol,
            shown,
            counts.count(symbol),
            code
        ));
    }
    rows
}

/// Bits an encoder spends on the counted input, saturating at `u64::MAX`.
fn encoded_length(counts: &FrequencyTable, codes: &CodeTable) -> u64 {
    codes
        .iter()
        .map(|(symbol, code)| counts.count(symbol).saturating_mul(code.len() as u64))
        .fold(0, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContainerError;
    use huffcode_core::bitio::BitWriter;
    use rstest::rstest;

    #[rstest]
    #[case::text(b"the quick brown fox jumps over the lazy dog\n".repeat(20))]
    #[case::single_symbol(vec![b'A'; 777])]
    #[case::all_bytes((0..=255u8).cycle().take(4096).collect())]
    fn test_compress_decompress_round_trip(#[case] data: Vec<u8>) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        fs::write(&input, &data).unwrap();

        let metrics = compress(&Input::File(input), dir.path()).unwrap();
        assert_eq!(metrics.raw_bytes, data.len() as u64);

        let output = dir.path().join("restored.bin");
        let metrics = decompress(
            &dir.path().join("input.code"),
            &dir.path().join("input.short"),
            &output,
        )
        .unwrap();

        assert_eq!(metrics.raw_bytes, data.len() as u64);
        assert_eq!(fs::read(&output).unwrap(), data);
    }

    #[test]
    fn test_compress_sample() {
        let dir = tempfile::tempdir().unwrap();
        let input = Input::Sample {
            seed: 42,
            size_bytes: 5000,
        };
        let metrics = compress(&input, dir.path()).unwrap();

        assert_eq!(metrics.raw_bytes, 5000);
        assert!(dir.path().join("sample.txt").exists());
        assert!(dir.path().join("sample.code").exists());
        assert!(metrics.bits_per_symbol() < 8.0);
    }

    #[test]
    fn test_code_file_is_text_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ab.txt");
        fs::write(&input, b"abb").unwrap();

        compress(&Input::File(input), dir.path()).unwrap();
        let text = fs::read_to_string(dir.path().join("ab.code")).unwrap();
        assert_eq!(text, "97\n0\n98\n1\n");
    }

    #[test]
    fn test_empty_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        fs::write(&input, b"").unwrap();

        assert!(matches!(
            compress(&Input::File(input), dir.path()),
            Err(AppError::Codec(huffcode_core::Error::Huffman(_)))
        ));
    }

    #[test]
    fn test_corrupted_container_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        fs::write(&input, b"some document text").unwrap();
        compress(&Input::File(input), dir.path()).unwrap();

        let short = dir.path().join("doc.short");
        let mut bytes = fs::read(&short).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x80;
        fs::write(&short, bytes).unwrap();

        let result = decompress(&dir.path().join("doc.code"), &short, &dir.path().join("out"));
        assert!(matches!(
            result,
            Err(AppError::Container(ContainerError::Crc { .. }))
        ));
    }

    #[test]
    fn test_failed_decode_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let code = dir.path().join("wide.code");
        // symbol 300 decodes fine but does not fit in a byte
        fs::write(&code, "65\n0\n300\n1\n").unwrap();

        let mut writer = BitWriter::new();
        for bit in [false, false, true, false] {
            writer.write_bit(bit);
        }
        let bit_len = writer.bit_len() as u64;
        let short = dir.path().join("wide.short");
        fs::write(&short, serialize_container(bit_len, &writer.finish())).unwrap();

        let output = dir.path().join("wide.out");
        let result = decompress(&code, &short, &output);
        assert!(matches!(
            result,
            Err(AppError::Codec(huffcode_core::Error::Decode(_)))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_reports_path() {
        let err = compress(&Input::File("/nonexistent/in.txt".into()), Path::new("."))
            .unwrap_err()
            .to_string();
        assert!(err.contains("/nonexistent/in.txt"));
    }

    #[test]
    fn test_code_rows_and_length() {
        let counts = FrequencyTable::from_bytes(b"aab");
        let tree = CodeTree::from_table(&counts).unwrap();
        let codes = tree.code_table();

        let rows = code_rows(&counts, &codes);
        // rows are in symbol order; the rarer b is popped first and gets 0
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("    97"));
        assert!(rows[1].ends_with("  1"));
        assert!(rows[2].ends_with("  0"));
        assert_eq!(encoded_length(&counts, &codes), 3);
    }

    #[test]
    fn test_encoded_length_saturates() {
        let mut counts = FrequencyTable::new();
        counts.add_count(0, u64::MAX);
        counts.add_count(1, 5);
        let tree = CodeTree::from_table(&counts).unwrap();
        assert_eq!(encoded_length(&counts, &tree.code_table()), u64::MAX);
    }

    #[test]
    fn test_single_symbol_length_uses_one_bit_codes() {
        let counts = FrequencyTable::from_bytes(b"zzzz");
        let tree = CodeTree::from_table(&counts).unwrap();
        assert_eq!(encoded_length(&counts, &tree.code_table()), 4);
    }
}
