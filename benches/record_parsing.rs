//! Benchmarks for Carbon record parsing
//!
//! Measures the per-record hot path of a session:
//! - field splitting and value classification
//! - full record parsing with the identity deconstructor
//! - full record parsing with bracketed dimensions
//!
//! Run with: cargo bench --bench record_parsing

use carbon_listener::deconstructor::{Deconstruct, MetricDeconstructor};
use carbon_listener::protocol::{parse_record, parse_value, split_fields, strip_line_ending};
use divan::{Bencher, black_box};

fn main() {
    divan::main();
}

const PLAIN: &[u8] = b"servers.web01.cpu.idle 98.5 1700000000\n";
const INTEGER: &[u8] = b"servers.web01.requests 1234 1700000000\n";
const TAGGED: &[u8] = b"cpu.idle[host:web01,dc:east,env:prod] 98.5 1700000000\n";
const INVALID: &[u8] = b"INVALIDLINE\n";

// =============================================================================
// Tokenizing
// =============================================================================

mod tokenize {
    use super::*;

    #[divan::bench(sample_count = 1000, sample_size = 1000)]
    fn split(bencher: Bencher) {
        let line = std::str::from_utf8(strip_line_ending(PLAIN)).unwrap();
        bencher.bench(|| black_box(split_fields(black_box(line))));
    }

    #[divan::bench(args = ["1234", "98.5", "1e9", "nope"])]
    fn value(bencher: Bencher, token: &str) {
        bencher.bench(|| black_box(parse_value(black_box(token))));
    }
}

// =============================================================================
// Full records
// =============================================================================

mod records {
    use super::*;

    #[divan::bench(sample_count = 1000, sample_size = 1000)]
    fn identity_float(bencher: Bencher) {
        let deconstructor = MetricDeconstructor::default();
        bencher.bench(|| {
            black_box(parse_record(
                strip_line_ending(black_box(PLAIN)),
                &deconstructor,
            ))
        });
    }

    #[divan::bench(sample_count = 1000, sample_size = 1000)]
    fn identity_integer(bencher: Bencher) {
        let deconstructor = MetricDeconstructor::default();
        bencher.bench(|| {
            black_box(parse_record(
                strip_line_ending(black_box(INTEGER)),
                &deconstructor,
            ))
        });
    }

    #[divan::bench(sample_count = 1000, sample_size = 1000)]
    fn commakeys_tagged(bencher: Bencher) {
        let deconstructor = MetricDeconstructor::load("commakeys", "").unwrap();
        bencher.bench(|| {
            black_box(parse_record(
                strip_line_ending(black_box(TAGGED)),
                &deconstructor,
            ))
        });
    }

    #[divan::bench(sample_count = 1000, sample_size = 1000)]
    fn invalid(bencher: Bencher) {
        let deconstructor = MetricDeconstructor::default();
        bencher.bench(|| {
            black_box(parse_record(
                strip_line_ending(black_box(INVALID)),
                &deconstructor,
            ))
        });
    }
}

// =============================================================================
// Deconstructors alone
// =============================================================================

mod deconstruct {
    use super::*;

    #[divan::bench(args = ["cpu.idle", "cpu.idle[host:web01]", "cpu.idle[host:web01,dc:east,env:prod,rack:r12]"])]
    fn commakeys(bencher: Bencher, token: &str) {
        let deconstructor = MetricDeconstructor::load("commakeys", "").unwrap();
        bencher.bench(|| black_box(deconstructor.deconstruct(black_box(token))));
    }
}
