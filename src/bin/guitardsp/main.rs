//! guitardsp - realtime guitar effects
//!
//! Run with: cargo run -- [IMPULSE.wav] [+/-GAIN_DB] [--tremolo --chorus ...]

mod device;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use log::{info, warn};

use guitar_dsp::config::{ChorusSettings, DelaySettings, FilterSettings, TremoloSettings};
use guitar_dsp::io::converter::{db_to_amp, is_gain_arg, parse_gain_db, ArgError};
use guitar_dsp::io::{wav, ImpulseResponse, OfflineIo};
use guitar_dsp::{
    engine, ChainFilters, DspError, EffectChain, EngineConfig, DEFAULT_IR_LENGTH, DEFAULT_PERIODS,
    DEFAULT_PERIOD_SIZE,
};

/// Realtime guitar effects: cabinet convolution, low-cut, tremolo,
/// chorus/flange and delay.
#[derive(Parser, Debug)]
#[command(name = "guitardsp")]
#[command(version)]
struct Cli {
    /// Impulse response (mono WAV, 44.1 or 48 kHz) and/or gain in dB
    /// starting with + or -, in any order
    #[arg(allow_negative_numbers = true, value_name = "IR | ±GAIN_DB")]
    args: Vec<String>,

    /// 150 Hz low-cut filter
    #[arg(long)]
    lowcut: bool,

    /// Tremolo, depth 0.4 at 3.5 Hz
    #[arg(long)]
    tremolo: bool,

    /// Chorus with a warm lowpass on the delay line
    #[arg(long)]
    chorus: bool,

    /// 250 ms delay with a lowpass in the feedback loop
    #[arg(long)]
    delay: bool,

    /// Samples per period (multiple of 4)
    #[arg(long, default_value_t = DEFAULT_PERIOD_SIZE)]
    period_size: usize,

    /// Periods buffered by the device
    #[arg(long, default_value_t = DEFAULT_PERIODS)]
    periods: usize,

    /// Longest impulse response kept, in samples (multiple of 4)
    #[arg(long, default_value_t = DEFAULT_IR_LENGTH)]
    ir_length: usize,

    /// Sample rate when no impulse response is loaded
    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,

    /// Process a WAV file offline instead of opening the audio device
    #[arg(long, num_args = 2, value_names = ["IN", "OUT"])]
    render: Option<Vec<PathBuf>>,
}

/// Positional arguments sorted into their roles.
#[derive(Debug, Default, PartialEq)]
struct Positionals {
    ir_path: Option<PathBuf>,
    gain_db: f32,
}

impl Positionals {
    /// Signed arguments are gains; anything else is the IR path. Later
    /// arguments of the same kind win.
    fn classify(args: &[String]) -> Result<Self, ArgError> {
        let mut positionals = Self::default();
        for arg in args {
            if arg.chars().count() < 2 {
                return Err(ArgError::TooShort(arg.clone()));
            }
            if is_gain_arg(arg) {
                positionals.gain_db = parse_gain_db(arg)?;
            } else {
                positionals.ir_path = Some(PathBuf::from(arg));
            }
        }
        Ok(positionals)
    }
}

impl Cli {
    fn engine_config(&self, gain: f32) -> EngineConfig {
        let mut config = EngineConfig::new()
            .with_sample_rate(self.sample_rate)
            .with_period_size(self.period_size)
            .with_periods(self.periods)
            .with_max_ir_length(self.ir_length)
            .with_gain(gain);
        if self.lowcut {
            config = config.with_highpass(FilterSettings::lowcut());
        }
        if self.tremolo {
            config = config.with_tremolo(TremoloSettings::default());
        }
        if self.chorus {
            config = config.with_chorus(ChorusSettings::default());
        }
        if self.delay {
            config = config.with_delay(DelaySettings::default());
        }
        config
    }
}

fn main() -> EyreResult<ExitCode> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return Ok(if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };

    let positionals = match Positionals::classify(&cli.args) {
        Ok(positionals) => positionals,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("Gain: {} dB", positionals.gain_db);

    let mut config = cli.engine_config(db_to_amp(positionals.gain_db));

    // Offline input decides the rate unless an IR overrides it below.
    let render_input = match cli.render.as_deref() {
        Some([input, _]) => {
            let (rate, samples) = wav::read_mono(input)
                .wrap_err_with(|| format!("failed to read '{}'", input.display()))?;
            config.sample_rate = rate;
            Some(samples)
        }
        _ => None,
    };

    let ir = load_ir(positionals.ir_path.as_deref())?;
    let mut filters = ChainFilters::default();
    let mut chain = EffectChain::new(&config, ir.as_ref(), &mut filters)
        .wrap_err("failed to build the effect chain")?;
    if let Some(path) = &positionals.ir_path {
        println!("IR '{}' Loaded.", path.display());
    }

    match (cli.render.as_deref(), render_input) {
        (Some([_, output]), Some(samples)) => {
            if chain.sample_rate() != config.sample_rate {
                warn!(
                    "input is {} Hz but the impulse response is {} Hz; rendering at {} Hz",
                    config.sample_rate,
                    chain.sample_rate(),
                    chain.sample_rate()
                );
            }
            let tail = if ir.is_some() { config.max_ir_length } else { 0 };
            let mut io = OfflineIo::new(samples).with_tail(tail);
            let periods = engine::run(&mut io, &mut chain)?;
            wav::write_mono(output, chain.sample_rate(), io.output())
                .wrap_err_with(|| format!("failed to write '{}'", output.display()))?;
            info!("rendered {periods} periods to '{}'", output.display());
        }
        _ => {
            let live = config.clone().with_sample_rate(chain.sample_rate());
            let (mut io, _duplex) = device::open(&live)?;
            info!("playing... press Ctrl+C to stop");
            match engine::run(&mut io, &mut chain) {
                Ok(_) | Err(DspError::Stream(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_ir(path: Option<&std::path::Path>) -> EyreResult<Option<ImpulseResponse>> {
    match path {
        None => {
            println!("No IR.");
            Ok(None)
        }
        Some(path) => wav::load_impulse_response(path)
            .map(Some)
            .wrap_err_with(|| format!("failed to load impulse response '{}'", path.display())),
    }
}
