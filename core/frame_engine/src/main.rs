use std::process::ExitCode;

use frame_engine::{
    device_manager::{AudioDeviceManager, cpal_dm::CpalAudioDeviceManager},
    factory::Factory,
    playback::{Player, command::PlayerCommandProducer},
    producer::varispeed::{VarispeedConfig, VarispeedProducer},
    profile::Profile,
};
use log::{error, info};
use rtrb::RingBuffer;

const USAGE: &str = "usage: frame_engine <resource> [speed] [start end]";

fn parse_config(args: &[String]) -> Result<VarispeedConfig, String> {
    let mut config = VarispeedConfig::default();

    if let Some(speed) = args.first() {
        config.speed = speed
            .parse()
            .map_err(|_| format!("invalid speed '{speed}'"))?;
    }

    match args.get(1..3) {
        Some([start, end]) => {
            config.limit_enabled = true;
            config.start_frame = start
                .parse()
                .map_err(|_| format!("invalid start frame '{start}'"))?;
            config.end_frame = end
                .parse()
                .map_err(|_| format!("invalid end frame '{end}'"))?;
        }
        _ if args.len() > 1 => return Err(USAGE.to_owned()),
        _ => {}
    }

    Ok(config)
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((resource, rest)) = args.split_first() else {
        error!("{USAGE}");
        return ExitCode::FAILURE;
    };
    let config = match parse_config(rest) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let factory = Factory::with_defaults();
    let profile = Profile::default();
    let producer = match VarispeedProducer::with_config(&factory, &profile, resource, config) {
        Ok(producer) => producer,
        Err(e) => {
            error!("Failed to open '{resource}': {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut manager = CpalAudioDeviceManager::new();
    let output_frequency = match manager.output_frequency() {
        Ok(frequency) => frequency,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // Commands are not sent from here yet, but the producer half must stay alive
    let (_commands, consumer): (PlayerCommandProducer, _) = RingBuffer::new(64);
    let player = Player::new(Box::new(producer), consumer, profile, output_frequency);

    match manager.start_output_stream(Box::new(player)) {
        Ok(()) => {
            info!("Playing '{resource}' at speed {}", config.speed);
            std::thread::park(); // Keep main alive to keep stream alive
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to start audio stream: {e}");
            ExitCode::FAILURE
        }
    }
}
