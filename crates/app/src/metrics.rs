//! Metrics collection and reporting for codec runs.
//!
//! Tracks sizes and timing for one compress or decompress run:
//! - Raw size (input to compress, output of decompress)
//! - Tree shape (distinct symbols, depth) and tree file size
//! - Encoded bits and container size
//!
//! # Thread Safety
//!
//! The `Metrics` struct is NOT thread-safe; a run updates it from a single
//! thread at each stage.

use std::time::{Duration, Instant};

/// Metrics for a single run.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Sizes ===
    /// Uncompressed bytes (read by compress, written by decompress)
    pub raw_bytes: u64,

    /// Bytes in the tree description file
    pub tree_bytes: u64,

    /// Meaningful bits in the packed payload
    pub encoded_bits: u64,

    /// Bytes in the container file, header included
    pub container_bytes: u64,

    // === Tree ===
    /// Leaves in the code tree
    pub distinct_symbols: u64,

    /// Longest code length
    pub tree_depth: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            raw_bytes: 0,
            tree_bytes: 0,
            encoded_bits: 0,
            container_bytes: 0,
            distinct_symbols: 0,
            tree_depth: 0,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Compressed size (tree file + container) over raw size.
    ///
    /// Returns 0.0 if nothing was processed.
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            (self.tree_bytes + self.container_bytes) as f64 / self.raw_bytes as f64
        }
    }

    /// Average code length per input byte.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.encoded_bits as f64 / self.raw_bytes as f64
        }
    }

    /// Compute throughput in raw bytes/second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.raw_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("=== Tree ===");
        println!("Distinct symbols: {}", self.distinct_symbols);
        println!("Depth: {}", self.tree_depth);
        println!("Tree file: {} bytes", self.tree_bytes);
        println!();

        println!("=== Compression ===");
        println!(
            "Raw bytes: {} ({:.2} KiB)",
            self.raw_bytes,
            self.raw_bytes as f64 / 1024.0
        );
        println!("Encoded bits: {}", self.encoded_bits);
        println!("Container: {} bytes", self.container_bytes);
        println!("Bits per symbol: {:.3}", self.bits_per_symbol());
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();

        println!("=== Performance ===");
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Print just the final result.
    pub fn print_result(&self) {
        println!(
            "✓ {} raw bytes <-> {} encoded bits in {} ms",
            self.raw_bytes,
            self.encoded_bits,
            self.duration().as_millis()
        );
    }

    /// Export metrics as `key=value` lines.
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             raw_bytes={}\n\
             tree_bytes={}\n\
             encoded_bits={}\n\
             container_bytes={}\n\
             distinct_symbols={}\n\
             tree_depth={}\n\
             compression_ratio={:.4}\n\
             bits_per_symbol={:.4}\n",
            self.duration().as_millis(),
            self.raw_bytes,
            self.tree_bytes,
            self.encoded_bits,
            self.container_bytes,
            self.distinct_symbols,
            self.tree_depth,
            self.compression_ratio(),
            self.bits_per_symbol(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert!(metrics.end_time.is_none());
        assert!(metrics.duration().as_millis() < 100);
    }

    #[test]
    fn test_compression_ratio() {
        let mut metrics = Metrics::new();
        metrics.raw_bytes = 1000;
        metrics.tree_bytes = 50;
        metrics.container_bytes = 700;

        assert_eq!(metrics.compression_ratio(), 0.75);
    }

    #[test]
    fn test_bits_per_symbol() {
        let mut metrics = Metrics::new();
        assert_eq!(metrics.bits_per_symbol(), 0.0);

        metrics.raw_bytes = 100;
        metrics.encoded_bits = 250;
        assert_eq!(metrics.bits_per_symbol(), 2.5);
    }

    #[test]
    fn test_export_text() {
        let mut metrics = Metrics::new();
        metrics.raw_bytes = 1000;
        metrics.encoded_bits = 2500;
        metrics.tree_depth = 6;

        let text = metrics.export_text();
        assert!(text.contains("raw_bytes=1000\n"));
        assert!(text.contains("encoded_bits=2500\n"));
        assert!(text.contains("tree_depth=6\n"));
        assert!(text.contains("bits_per_symbol=2.5000\n"));
        assert!(text.lines().all(|line| line.contains('=')));
    }

    #[test]
    fn test_throughput() {
        let mut metrics = Metrics::new();
        metrics.raw_bytes = 1_000_000;

        std::thread::sleep(Duration::from_millis(10));
        metrics.complete();

        assert!(metrics.throughput_bps() > 0.0);
    }
}
