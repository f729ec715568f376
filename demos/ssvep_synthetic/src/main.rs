use argh::FromArgs;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{f64::consts::PI, path::PathBuf};

use evoked::{
    linalg::Matrix,
    score::SimilarityService,
    ssvep::{SsvepConfig, SsvepDetector},
};

#[derive(FromArgs)]
/// Classify synthetic SSVEP trials
struct Args {
    /// path to a JSON detector configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// number of recording channels
    #[argh(option, short = 'n', default = "8")]
    channels: usize,

    /// amplitude of the uniform noise added to every channel
    #[argh(option, default = "2.0")]
    noise: f64,

    /// number of trials per stimulation frequency
    #[argh(option, short = 't', default = "5")]
    trials: usize,

    /// seed of the noise generator
    #[argh(option, default = "0")]
    seed: u64,
}

fn synthetic_trial(
    rng: &mut StdRng,
    config: &SsvepConfig,
    frequency: f64,
    channels: usize,
    noise: f64,
) -> Matrix {
    let gains = (0..channels)
        .map(|_| rng.random_range(0.2..1.0))
        .collect::<Vec<f64>>();
    let phase = rng.random_range(0.0..2.0 * PI);

    Matrix::from_fn(config.window_size(), channels, |r, c| {
        let t = r as f64 / config.sampling_rate;
        let angle = 2.0 * PI * frequency * t + phase;
        let response = angle.sin() + 0.5 * (2.0 * angle).sin();
        gains[c] * response + noise * (rng.random::<f64>() - 0.5)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => SsvepConfig::from_path(path)?,
        None => SsvepConfig::default(),
    };
    log::info!("config: {:?}", config);

    let detector = SsvepDetector::new(SimilarityService::new(), config.clone())?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut correct = 0;
    for (target, &frequency) in config.frequencies.iter().enumerate() {
        for trial in 0..args.trials {
            let window = synthetic_trial(&mut rng, &config, frequency, args.channels, args.noise);
            let prediction = detector.classify(&window)?;

            let predicted = prediction
                .target
                .map(|i| format!("{:.2}Hz", config.frequencies[i]))
                .unwrap_or_else(|| "none".to_string());
            println!(
                "{frequency:.2}Hz trial #{trial}: predicted {predicted}, scores [{}]",
                prediction
                    .scores
                    .iter()
                    .map(|s| format!("{s:.3}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            if prediction.target == Some(target) {
                correct += 1;
            }
        }
    }

    let total = config.frequencies.len() * args.trials;
    println!(
        "accuracy: {correct}/{total} ({:.1}%)",
        100.0 * correct as f64 / total.max(1) as f64
    );

    Ok(())
}
