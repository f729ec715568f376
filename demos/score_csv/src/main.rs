use argh::FromArgs;
use std::path::PathBuf;

use evoked::{
    io::read_matrix_csv,
    score::{MatrixDescriptor, SimilarityService},
};

#[derive(FromArgs)]
/// Score two CSV matrices against each other
struct Args {
    /// path to the signal matrix, one sample per line
    #[argh(positional)]
    signal: PathBuf,

    /// path to the reference matrix, row-aligned with the signal
    #[argh(positional)]
    reference: PathBuf,

    /// precompute the reference decomposition before scoring
    #[argh(switch, short = 'p')]
    precompute: bool,

    /// print every canonical correlation instead of the largest one
    #[argh(switch, short = 'a')]
    all: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let service = SimilarityService::new();

    let signal = service.insert(read_matrix_csv(&args.signal)?)?;
    let reference = service.insert(read_matrix_csv(&args.reference)?)?;

    if args.precompute {
        service.precompute_qr(reference)?;
    }

    let x = MatrixDescriptor::stored(signal);
    let y = MatrixDescriptor::stored(reference);

    if args.all {
        let correlations = service.canonical_correlations(&x, &y)?;
        println!("R: {:?}", correlations);
    } else {
        println!("R: {}", service.canonical_correlation(&x, &y)?);
    }

    println!("power: {}", service.minimum_energy_combination(&x, &y)?);

    service.clear_all();

    Ok(())
}
