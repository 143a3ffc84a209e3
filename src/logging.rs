// src/logging.rs

use fern::colors::{Color, ColoredLevelConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    ERROR,
    WARN,
    #[default]
    INFO,
    DEBUG,
}

impl LogLevel {
    fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::ERROR => log::LevelFilter::Error,
            LogLevel::WARN => log::LevelFilter::Warn,
            LogLevel::INFO => log::LevelFilter::Info,
            LogLevel::DEBUG => log::LevelFilter::Debug,
        }
    }
}

pub fn setup_logging(level: LogLevel) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        // serenity and friends stay at warn, our own modules follow config
        .level(log::LevelFilter::Warn)
        .level_for("mogibot", level.to_filter())
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}
