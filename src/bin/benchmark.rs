use fluoroseq::{simulate, DyeSeq, ErrorModel, ErrorModelParams, ForwardAlgorithm};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
// Usage: benchmark [LEN] [SEED] [NUM_CHANNELS] [NUM_TIMESTEPS] [NUM]
fn main() -> std::io::Result<()> {
    env_logger::init();
    let args: Vec<_> = std::env::args().collect();
    let arg = |i: usize, default: u64| -> u64 {
        args.get(i).and_then(|x| x.parse().ok()).unwrap_or(default)
    };
    let len = arg(1, 20) as usize;
    let seed = arg(2, 4329);
    let num_channels = arg(3, 2) as usize;
    let num_timesteps = arg(4, 10) as usize;
    let num = arg(5, 100) as usize;
    let invalid = |why: fluoroseq::FluoroseqError| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, why.to_string())
    };
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let labels = (0..len)
        .map(|_| match rng.gen_bool(0.3) {
            true => Some(rng.gen_range(0..num_channels)),
            false => None,
        })
        .collect();
    let dye_seq = DyeSeq::new(labels);
    for (name, bg_lambda) in vec![("Safe", 0f64), ("General", 1f64)] {
        let params = ErrorModelParams {
            bg_lambda,
            ..ErrorModelParams::default()
        };
        let model = ErrorModel::new(params).map_err(invalid)?;
        let rads = (0..num)
            .map(|_| simulate::generate_radiometry(&model, &dye_seq, num_timesteps, num_channels, &mut rng))
            .collect::<fluoroseq::Result<Vec<_>>>()
            .map_err(invalid)?;
        let max_dyes = dye_seq
            .channel_counts(num_channels)
            .into_iter()
            .max()
            .unwrap_or(0);
        let forward = ForwardAlgorithm::new(model, max_dyes);
        let start = std::time::Instant::now();
        let mut total = 0f64;
        for rad in rads.iter() {
            total += forward.likelihood(&dye_seq, rad).map_err(invalid)?;
        }
        let end = std::time::Instant::now();
        let time = (end - start).as_micros();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{:e}\t{}",
            len,
            seed,
            num_channels,
            num_timesteps,
            num,
            time,
            total / num as f64,
            name
        );
    }
    Ok(())
}
