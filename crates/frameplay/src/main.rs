use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use frameplay::{AnimatedImage, Frame, PlaybackSettings, Repetitions, load_media};

const USAGE: &str = "usage: frameplay <image> [--repeat N|infinite] [--tick MS] [--dump DIR] [--save-settings]";

struct Args {
    path: PathBuf,
    repeat: Option<Repetitions>,
    tick_ms: Option<f64>,
    dump_dir: Option<PathBuf>,
    /// Persist `--repeat` and `--tick` as the new defaults.
    save_settings: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut path = None;
    let mut repeat = None;
    let mut tick_ms = None;
    let mut dump_dir = None;
    let mut save_settings = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--repeat" => {
                let value = args.next().context(USAGE)?;
                repeat = Some(parse_repeat(&value)?);
            }
            "--tick" => {
                let value = args.next().context(USAGE)?;
                let ms: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid tick '{value}'"))?;
                if !(ms.is_finite() && ms > 0.0) {
                    bail!("Tick must be positive, got {ms}");
                }
                tick_ms = Some(ms);
            }
            "--dump" => dump_dir = Some(PathBuf::from(args.next().context(USAGE)?)),
            "--save-settings" => save_settings = true,
            "-h" | "--help" => bail!(USAGE),
            _ if path.is_none() && !arg.starts_with("--") => path = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument '{arg}'\n{USAGE}"),
        }
    }

    Ok(Args {
        path: path.context(USAGE)?,
        repeat,
        tick_ms,
        dump_dir,
        save_settings,
    })
}

fn parse_repeat(value: &str) -> Result<Repetitions> {
    match value {
        "infinite" | "inf" => Ok(Repetitions::Infinite),
        n => Ok(Repetitions::Finite(
            n.parse()
                .with_context(|| format!("Invalid repeat count '{n}'"))?,
        )),
    }
}

fn dump_frame(dir: &Path, seq: usize, frame: &Frame) -> Result<()> {
    let (w, h) = frame.dimensions();
    let img = image::RgbaImage::from_raw(w, h, frame.pixels().to_vec())
        .context("Frame buffer does not match its dimensions")?;
    let path = dir.join(format!("frame_{seq:05}.png"));
    img.save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let mut settings = PlaybackSettings::load();
    if args.repeat.is_some() {
        settings.repetitions = args.repeat;
    }
    if let Some(tick_ms) = args.tick_ms {
        settings.tick_ms = tick_ms;
    }
    if args.save_settings {
        settings.save();
        log::info!("Saved playback settings");
    }

    let decoder = load_media(&args.path)
        .with_context(|| format!("Failed to open {}", args.path.display()))?;
    let mut anim = AnimatedImage::with_settings(decoder, &settings)?;

    if let Some(dir) = &args.dump_dir {
        std::fs::create_dir_all(dir)?;
    }

    anim.start();
    let mut now_ms = 0.0;
    let mut shown = None;
    let mut frames_shown = 0;
    loop {
        let running = anim.update(now_ms).is_some();

        let position = (anim.current_index(), anim.repetitions_completed());
        if shown != Some(position) {
            shown = Some(position);
            log::info!(
                "{:>8.1}ms  frame {:?}  loop {}",
                now_ms,
                position.0,
                position.1
            );
            if let Some(dir) = &args.dump_dir {
                dump_frame(dir, frames_shown, anim.active_frame())?;
            }
            frames_shown += 1;
        }

        if !running {
            break;
        }
        if now_ms >= settings.max_preview_ms {
            log::warn!(
                "Still animating after {:.0}ms, stopping preview",
                settings.max_preview_ms
            );
            anim.stop();
            break;
        }
        now_ms += settings.tick_ms;
    }

    if let Some(err) = anim.last_error() {
        bail!("Playback failed: {err}");
    }
    log::info!(
        "Showed {} frame{} over {:.1}ms",
        frames_shown,
        if frames_shown == 1 { "" } else { "s" },
        now_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn parses_all_options() {
        let a = args(&["anim.gif", "--repeat", "3", "--tick", "5", "--dump", "out"]).unwrap();
        assert_eq!(a.path, PathBuf::from("anim.gif"));
        assert_eq!(a.repeat, Some(Repetitions::Finite(3)));
        assert_eq!(a.tick_ms, Some(5.0));
        assert_eq!(a.dump_dir, Some(PathBuf::from("out")));
        assert!(!a.save_settings);
    }

    #[test]
    fn infinite_repeat() {
        let a = args(&["--repeat", "infinite", "x.gif"]).unwrap();
        assert_eq!(a.repeat, Some(Repetitions::Infinite));
    }

    #[test]
    fn save_settings_flag() {
        let a = args(&["x.gif", "--repeat", "2", "--save-settings"]).unwrap();
        assert!(a.save_settings);
        assert_eq!(a.repeat, Some(Repetitions::Finite(2)));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(args(&[]).is_err());
        assert!(args(&["x.gif", "--tick", "0"]).is_err());
        assert!(args(&["x.gif", "--tick", "NaN"]).is_err());
        assert!(args(&["x.gif", "--repeat", "many"]).is_err());
        assert!(args(&["x.gif", "y.gif"]).is_err());
        assert!(args(&["x.gif", "--bogus"]).is_err());
    }
}
