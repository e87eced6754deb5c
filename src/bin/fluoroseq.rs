use clap::{App, Arg, ArgMatches, SubCommand};
use fluoroseq::{Classifier, DyeSeq, ErrorModel, ErrorModelParams, Radiometry};
use std::io::{BufRead, Write};
#[macro_use]
extern crate log;

fn common_args<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
    app.arg(
        Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .help("Debug mode"),
    )
    .arg(
        Arg::with_name("threads")
            .long("threads")
            .short("t")
            .takes_value(true)
            .default_value("1")
            .help("Number of threads"),
    )
    .arg(
        Arg::with_name("timesteps")
            .long("timesteps")
            .takes_value(true)
            .required(true)
            .help("Number of timesteps, including the one before any Edman cycle."),
    )
    .arg(
        Arg::with_name("channels")
            .long("channels")
            .takes_value(true)
            .required(true)
            .help("Number of color channels."),
    )
}

// (name, default, help)
const MODEL_PARAMS: [(&str, &str, &str); 7] = [
    ("edman_eff", "0.94", "Pr{an Edman cycle succeeds}."),
    ("bleach_rate", "0.05", "Pr{a dye bleaches in a cycle}."),
    ("dud_rate", "0.07", "Pr{a dye is a dud}."),
    ("mu", "1.0", "Mean intensity of a single dye."),
    ("sigma", "0.16", "Standard deviation of a single dye."),
    ("bg_lambda", "0.0", "Rate of the exponential background. 0 for no background."),
    ("detach_rate", "0.05", "Pr{the peptide detaches in a cycle}."),
];

fn model_args<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
    MODEL_PARAMS
        .iter()
        .fold(app, |app, &(name, default, help)| {
            app.arg(
                Arg::with_name(name)
                    .long(name)
                    .takes_value(true)
                    .default_value(default)
                    .help(help),
            )
        })
        .arg(
            Arg::with_name("lognormal")
                .long("lognormal")
                .help("Log-normal intensities. Requires --bg_lambda 0."),
        )
}

fn subcommand_score() -> App<'static, 'static> {
    let app = SubCommand::with_name("score")
        .version("0.1")
        .about("Likelihood of a radiometry given a dye sequence.")
        .arg(
            Arg::with_name("dye_seq")
                .long("dye_seq")
                .short("d")
                .takes_value(true)
                .required(true)
                .help("Dye sequence such as ..0.1, the first position is cleaved first."),
        )
        .arg(
            Arg::with_name("radiometry")
                .long("radiometry")
                .short("r")
                .takes_value(true)
                .required(true)
                .help("Intensities, timestep-major, separated by spaces or commas."),
        );
    model_args(common_args(app))
}

fn subcommand_classify() -> App<'static, 'static> {
    let app = SubCommand::with_name("classify")
        .version("0.1")
        .about("Classify each radiometry by the most likely dye sequence.")
        .arg(
            Arg::with_name("dye_seqs")
                .long("dye_seqs")
                .short("d")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("A dye sequence per line, optionally followed by a tab and a weight."),
        )
        .arg(
            Arg::with_name("radiometries")
                .long("radiometries")
                .short("r")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("A radiometry per line."),
        );
    model_args(common_args(app))
}

fn subcommand_simulate() -> App<'static, 'static> {
    let app = SubCommand::with_name("simulate")
        .version("0.1")
        .about("Simulate radiometries from dye sequences.")
        .arg(
            Arg::with_name("dye_seqs")
                .long("dye_seqs")
                .short("d")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("A dye sequence per line."),
        )
        .arg(
            Arg::with_name("num")
                .long("num")
                .short("n")
                .takes_value(true)
                .default_value("100")
                .help("Number of radiometries per dye sequence."),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("32389")
                .help("Seed"),
        );
    model_args(common_args(app))
}

fn invalid_input<E: std::fmt::Display>(why: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, why.to_string())
}

fn parse_arg<T>(matches: &ArgMatches, name: &str) -> std::io::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = matches
        .value_of(name)
        .ok_or_else(|| invalid_input(format!("--{} is missing", name)))?;
    value
        .parse()
        .map_err(|why| invalid_input(format!("--{} {}:{}", name, value, why)))
}

fn error_model(matches: &ArgMatches) -> std::io::Result<ErrorModel> {
    let params = ErrorModelParams {
        edman_eff: parse_arg(matches, "edman_eff")?,
        bleach_rate: parse_arg(matches, "bleach_rate")?,
        dud_rate: parse_arg(matches, "dud_rate")?,
        mu: parse_arg(matches, "mu")?,
        sigma: parse_arg(matches, "sigma")?,
        bg_lambda: parse_arg(matches, "bg_lambda")?,
        detach_rate: parse_arg(matches, "detach_rate")?,
        lognormal: matches.is_present("lognormal"),
    };
    let model = ErrorModel::new(params).map_err(invalid_input)?;
    debug!("MODEL\n{}", model);
    Ok(model)
}

fn read_lines(path: &str) -> std::io::Result<Vec<String>> {
    let rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
    let lines = rdr.lines().collect::<std::io::Result<Vec<_>>>()?;
    Ok(lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect())
}

fn read_dye_seqs(path: &str, num_channels: usize) -> std::io::Result<Vec<(DyeSeq, f64)>> {
    read_lines(path)?
        .iter()
        .map(|line| {
            let mut fields = line.split('\t');
            let seq = fields.next().unwrap_or("");
            let dye_seq = DyeSeq::from_str_with_channels(seq, num_channels).map_err(invalid_input)?;
            let weight = match fields.next() {
                Some(weight) => weight
                    .trim()
                    .parse::<f64>()
                    .map_err(|why| invalid_input(format!("{:?}:{}", weight, why)))?,
                None => 1f64,
            };
            Ok((dye_seq, weight))
        })
        .collect()
}

fn score(matches: &ArgMatches) -> std::io::Result<()> {
    let num_timesteps: usize = parse_arg(matches, "timesteps")?;
    let num_channels: usize = parse_arg(matches, "channels")?;
    let model = error_model(matches)?;
    let dye_seq = matches.value_of("dye_seq").unwrap_or("");
    let dye_seq = DyeSeq::from_str_with_channels(dye_seq, num_channels).map_err(invalid_input)?;
    let radiometry = matches.value_of("radiometry").unwrap_or("");
    let radiometry =
        Radiometry::parse(radiometry, num_timesteps, num_channels).map_err(invalid_input)?;
    let lk = fluoroseq::likelihood(&model, &dye_seq, &radiometry).map_err(invalid_input)?;
    println!("{}", lk);
    Ok(())
}

fn classify(matches: &ArgMatches) -> std::io::Result<()> {
    let num_timesteps: usize = parse_arg(matches, "timesteps")?;
    let num_channels: usize = parse_arg(matches, "channels")?;
    let model = error_model(matches)?;
    let candidates = read_dye_seqs(matches.value_of("dye_seqs").unwrap_or(""), num_channels)?;
    let radiometries = read_lines(matches.value_of("radiometries").unwrap_or(""))?
        .iter()
        .map(|line| Radiometry::parse(line, num_timesteps, num_channels))
        .collect::<fluoroseq::Result<Vec<_>>>()
        .map_err(invalid_input)?;
    debug!("Read {} candidates and {} radiometries", candidates.len(), radiometries.len());
    let classifier = Classifier::new(model, num_channels, candidates).map_err(invalid_input)?;
    let start = std::time::Instant::now();
    let results = classifier.classify_all(&radiometries).map_err(invalid_input)?;
    let end = std::time::Instant::now();
    info!("Classified in {}ms", (end - start).as_millis());
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    for (i, result) in results.iter().enumerate() {
        writeln!(wtr, "{}\t{}", i, result)?;
    }
    wtr.flush()
}

fn simulate(matches: &ArgMatches) -> std::io::Result<()> {
    let num_timesteps: usize = parse_arg(matches, "timesteps")?;
    let num_channels: usize = parse_arg(matches, "channels")?;
    let num: usize = parse_arg(matches, "num")?;
    let seed: u64 = parse_arg(matches, "seed")?;
    let model = error_model(matches)?;
    let dye_seqs: Vec<_> = read_dye_seqs(matches.value_of("dye_seqs").unwrap_or(""), num_channels)?
        .into_iter()
        .map(|(dye_seq, _)| dye_seq)
        .collect();
    let radiometries = fluoroseq::simulate::generate_radiometries(
        &model,
        &dye_seqs,
        num_timesteps,
        num_channels,
        num,
        seed,
    )
    .map_err(invalid_input)?;
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    for (i, radiometry) in radiometries.iter() {
        writeln!(wtr, "{}\t{}", i, radiometry)?;
    }
    wtr.flush()
}

fn main() -> std::io::Result<()> {
    let matches = App::new("fluoroseq")
        .version("0.1")
        .about("Score:[DYESEQ]x[RADIOMETRY]->LK, Classify:[DYESEQS]x[RADIOMETRIES]->[ID], or Simulate:[DYESEQS]->[RADIOMETRIES]")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .subcommand(subcommand_score())
        .subcommand(subcommand_classify())
        .subcommand(subcommand_simulate())
        .get_matches();
    if let Some(sub_m) = matches.subcommand().1 {
        let level = match sub_m.occurrences_of("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
        let threads: usize = parse_arg(sub_m, "threads")?;
        if let Err(why) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            debug!("{:?}", why);
        }
    }
    debug!("Start");
    match matches.subcommand() {
        ("score", Some(sub_m)) => score(sub_m),
        ("classify", Some(sub_m)) => classify(sub_m),
        ("simulate", Some(sub_m)) => simulate(sub_m),
        _ => unreachable!(),
    }
}
