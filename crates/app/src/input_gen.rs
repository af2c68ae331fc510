//! Sample input generation.
//!
//! When `compress` is given no input file we generate English-looking text
//! from a seed. Word choice is skewed toward the front of the vocabulary,
//! so letter frequencies are uneven and the code tree has visibly different
//! code lengths. Occasional runs of a single byte and a few random bytes
//! add rare symbols to the alphabet.

use std::io::Write;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const VOCABULARY: &[&str] = &[
    "the", "of", "and", "a", "to", "in", "is", "that", "it", "was", "for", "on", "tree", "code",
    "bit", "leaf", "symbol", "prefix", "stream", "weight", "branch", "decode", "huffman",
    "frequency", "quietly", "zephyr", "jukebox",
];

/// Generate `size_bytes` of sample text.
///
/// Output is fully determined by `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes + 32);
    let mut words_on_line = 0;

    while data.len() < size_bytes {
        match rng.gen_range(0..100) {
            // a run of one byte
            0 => {
                let byte = if rng.gen_bool(0.5) { b'-' } else { b'=' };
                let len = rng.gen_range(4..=24);
                data.extend(std::iter::repeat(byte).take(len));
            }
            // a rare byte outside the vocabulary's letters
            1 => data.push(rng.gen_range(b'0'..=b'9')),
            _ => {
                // squaring a uniform draw favors low indices
                let r: f64 = rng.gen();
                let index = ((r * r) * VOCABULARY.len() as f64) as usize;
                data.extend_from_slice(VOCABULARY[index.min(VOCABULARY.len() - 1)].as_bytes());
            }
        }

        words_on_line += 1;
        if words_on_line >= 12 {
            data.push(b'\n');
            words_on_line = 0;
        } else {
            data.push(b' ');
        }
    }

    data.truncate(size_bytes);
    data
}

/// Write generated data to a file.
pub fn write_sample_file(path: &Path, seed: u64, size_bytes: usize) -> std::io::Result<Vec<u8>> {
    let data = generate_sample_data(seed, size_bytes);
    let mut file = std::fs::File::create(path)?;
    file.write_all(&data)?;
    Ok(data)
}
