// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Benchmark driver comparing the Othello hash and the MLBF cascade on two
//! key files: build time, memory, query latency, throughput, error count.
//!
//! ```text
//! cargo run --release --example classify_bench -- revoked.txt stay.txt
//! ```

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

use clap::Parser;
use keyclass::common::RandomSource;
use keyclass::common::XorShift64;
use keyclass::mlbf::MlbfCascade;
use keyclass::othello::OthelloBuilder;

const REVOKED_FLAG: bool = true;
const STAY_FLAG: bool = false;

#[derive(Parser)]
#[command(about = "Compare Othello and MLBF classifiers on two key files")]
struct Args {
    /// File with one revoked key per line
    revoked_file: PathBuf,
    /// File with one staying key per line
    stay_file: PathBuf,
    /// Number of random queries per structure
    #[arg(long, default_value_t = 1_000_000)]
    queries: usize,
}

fn main() {
    let args = Args::parse();

    let revoked = match load_keys(&args.revoked_file) {
        Ok(keys) => keys,
        Err(err) => {
            eprintln!("ERROR: {}: {err}", args.revoked_file.display());
            exit(-1);
        }
    };
    let stay = match load_keys(&args.stay_file) {
        Ok(keys) => keys,
        Err(err) => {
            eprintln!("ERROR: {}: {err}", args.stay_file.display());
            exit(-1);
        }
    };
    println!(
        "Loaded {} revoked and {} staying keys",
        revoked.len(),
        stay.len()
    );

    let start = Instant::now();
    let keys: Vec<String> = revoked.iter().chain(stay.iter()).cloned().collect();
    let values: Vec<bool> = revoked
        .iter()
        .map(|_| REVOKED_FLAG)
        .chain(stay.iter().map(|_| STAY_FLAG))
        .collect();
    let othello = match OthelloBuilder::default().build(keys, values) {
        Ok(othello) => othello,
        Err(err) => {
            eprintln!("ERROR: Othello build failed: {err}");
            exit(-1);
        }
    };
    println!("Othello build time: {}ms", start.elapsed().as_millis());

    let start = Instant::now();
    let cascade = MlbfCascade::builder().base_fpp(0.5).build(&revoked, &stay);
    println!("MLBF build time: {}ms", start.elapsed().as_millis());

    println!("Othello size: {:.3}MB", mb(othello.byte_size()));
    println!(
        "MLBF size: {:.3}MB across {} levels",
        mb(cascade.byte_size()),
        cascade.levels()
    );

    let total = revoked.len() + stay.len();
    if total == 0 || args.queries == 0 {
        return;
    }
    let mut rng = XorShift64::seeded(0x1990_0111);
    let picks: Vec<usize> = (0..args.queries)
        .map(|_| rng.next_u64() as usize % total)
        .collect();

    println!("---Othello---");
    let start = Instant::now();
    let mut errors = 0usize;
    for &pick in &picks {
        let (key, expected) = if pick < revoked.len() {
            (&revoked[pick], REVOKED_FLAG)
        } else {
            (&stay[pick - revoked.len()], STAY_FLAG)
        };
        if othello.query(key) != expected {
            errors += 1;
        }
    }
    report(start.elapsed().as_micros(), picks.len(), errors);

    println!("---MLBF---");
    let start = Instant::now();
    let mut errors = 0usize;
    for &pick in &picks {
        let (key, expected) = if pick < revoked.len() {
            (&revoked[pick], REVOKED_FLAG)
        } else {
            (&stay[pick - revoked.len()], STAY_FLAG)
        };
        if cascade.contains(key) != expected {
            errors += 1;
        }
    }
    report(start.elapsed().as_micros(), picks.len(), errors);
}

/// Reads one key per line, keeping the first half of each line. The
/// halving matches the datasets the published benchmark numbers were
/// measured on; it is not something a library consumer should imitate.
fn load_keys(path: &Path) -> std::io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut keys = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let mut cut = line.len() / 2;
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        keys.push(line[..cut].to_string());
    }
    Ok(keys)
}

fn report(elapsed_us: u128, queries: usize, errors: usize) {
    println!("Error count: {errors}");
    println!(
        "Average query time: {:.4}us",
        elapsed_us as f64 / queries as f64
    );
    println!(
        "Query throughput: {:.0} queries/s",
        queries as f64 * 1_000_000.0 / elapsed_us.max(1) as f64
    );
}

fn mb(bytes: usize) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
