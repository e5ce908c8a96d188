//! relring demo - menjalankan skenario wraparound dan relokasi
//!
//! Usage:
//!   cargo run --release -- --capacity 2 --rounds 3
//!   RUST_LOG=debug cargo run -- --capacity 4

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relring::{MmapRegion, RawRing, RingBuffer, RingConfig, RingError};

/// Demo configuration
#[derive(Parser, Debug)]
#[command(name = "relring", version, about = "Fixed-capacity ring buffer relocation demo")]
struct Args {
    /// Jumlah element yang bisa disimpan
    #[arg(short, long, default_value_t = RingConfig::default().capacity)]
    capacity: usize,

    /// Ukuran element untuk ring berbasis bytes (minimal 4)
    #[arg(short, long, default_value_t = RingConfig::default().element_size)]
    element_size: usize,

    /// Berapa kali fill + drain untuk melewati ujung storage
    #[arg(short, long, default_value_t = 3)]
    rounds: usize,

    /// Filter log jika RUST_LOG tidak di-set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn ring_config(&self) -> RingConfig {
        RingConfig::new(self.capacity, self.element_size)
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    if let Err(e) = run(&args) {
        eprintln!("❌ Demo error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.ring_config();
    config.validate().context("invalid ring geometry")?;
    ensure!(
        config.element_size >= std::mem::size_of::<u32>(),
        "element size must hold a u32 tag"
    );

    info!(
        capacity = config.capacity,
        element_size = config.element_size,
        "starting demo"
    );

    typed_wraparound(config.capacity, args.rounds)?;
    typed_relocation(config.capacity)?;
    raw_relocation(config)?;

    info!("✅ all scenarios passed");
    Ok(())
}

/// Fill dan drain berulang kali, memastikan FIFO tetap benar setelah wrap
fn typed_wraparound(capacity: usize, rounds: usize) -> Result<()> {
    let mut rb: RingBuffer<u64> = RingBuffer::new(capacity)?;
    let mut next = 0u64;

    for round in 0..rounds {
        let first = next;
        while rb.push(next).is_ok() {
            next += 1;
        }
        ensure!(rb.is_full(), "ring should be full after rejected push");

        for expected in first..next {
            let got = rb.pop()?;
            ensure!(got == expected, "FIFO order broken: {got} != {expected}");
        }
        ensure!(rb.pop() == Err(RingError::Empty), "ring should be empty");
        rb.validate()?;

        info!(round, pushed = next - first, cursors = ?rb.cursors(), "round drained");
    }
    Ok(())
}

/// Copy dan move typed ring ke storage baru
fn typed_relocation(capacity: usize) -> Result<()> {
    let mut rb: RingBuffer<String> = RingBuffer::new(capacity)?;
    for i in 0..capacity {
        rb.push(format!("msg-{i}"))
            .map_err(RingError::from)
            .context("filling typed ring")?;
    }

    let copy = rb.relocate()?;
    copy.validate()?;
    info!(from = ?rb.base_ptr(), to = ?copy.base_ptr(), "typed copy relocated");

    let mut moved = rb.transfer()?;
    ensure!(rb.is_empty(), "source should be reset after move");

    for (expected, original) in copy.iter().zip(std::iter::from_fn(|| moved.pop().ok())) {
        ensure!(*expected == original, "relocated content differs");
    }
    info!(entries = ?copy, "typed move verified");
    Ok(())
}

/// Relokasi ring bytes dari heap ke region mmap anonim
fn raw_relocation(config: RingConfig) -> Result<()> {
    let size = config.required_size()?;
    let mut heap = vec![0u8; size];
    let mut src = RawRing::new(&mut heap, config.capacity, config.element_size)?;

    let mut element = vec![0u8; config.element_size];
    for tag in 0..config.capacity as u32 {
        element[..4].copy_from_slice(&tag.to_le_bytes());
        src.push(&element)?;
    }

    let mut region = MmapRegion::anon(size).context("mapping destination region")?;
    let mut dst = src.relocate_move(region.as_mut_slice())?;
    dst.validate()?;
    ensure!(src.is_empty(), "source should be reset after move");

    info!(from = ?src.slot_base(), to = ?dst.slot_base(), ring = ?dst, "raw ring moved");

    for tag in 0..config.capacity as u32 {
        dst.pop(&mut element)?;
        let got = u32::from_le_bytes([element[0], element[1], element[2], element[3]]);
        ensure!(got == tag, "raw FIFO order broken: {got} != {tag}");
    }
    Ok(())
}
