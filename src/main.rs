//! Generate a VCD file containing a JTAG IDCODE read.
//!
//! Usage: `jtag-vcd <OUTFILE>`
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};

use jtag_vcd::Error;

#[derive(Parser, Debug)]
#[command(name = "jtag-vcd", version)]
#[command(about = "Generate a VCD file containing JTAG transactions")]
struct Args {
    /// Path to the VCD file to create
    outfile: PathBuf,
}

fn run(args: &Args) -> jtag_vcd::Result<u64> {
    let file = File::create(&args.outfile).map_err(|source| Error::Open {
        path: args.outfile.clone(),
        source,
    })?;

    // Same layout as asctime(), e.g. "Mon Oct 19 14:03:07 2026"
    let date = chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string();
    jtag_vcd::generate(BufWriter::new(file), &date)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match run(&args) {
        Ok(step) => info!("Wrote {} ({} steps)", args.outfile.display(), step),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
