//! Rig sampling utility
//!
//! Loads a rig JSON, plays one clip for a number of frames at a fixed frame
//! rate and prints the translation of every bone's palette matrix.
//!
//! Usage:
//!     sample_pose [OPTIONS] <RIG_JSON>
//!
//! Options:
//!     -c, --clip <CLIP>       Clip index or name (default: 0)
//!     -f, --frames <N>        Number of frames to sample (default: 10)
//!     --fps <FPS>             Frame rate in frames per second (default: 30)
//!     --speed <SPEED>         Playback speed multiplier (default: 1.0)
//!     --config <PATH>         Animation config JSON (default: built-in defaults)
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use origin_anim::animation::{Animator, RigAsset};
use origin_anim::core::{logging, AnimationConfig};

fn print_help() {
    eprintln!("sample_pose - Rig sampling utility");
    eprintln!();
    eprintln!("Usage: sample_pose [OPTIONS] <RIG_JSON>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -c, --clip <CLIP>       Clip index or name (default: 0)");
    eprintln!("    -f, --frames <N>        Number of frames to sample (default: 10)");
    eprintln!("    --fps <FPS>             Frame rate in frames per second (default: 30)");
    eprintln!("    --speed <SPEED>         Playback speed multiplier (default: 1.0)");
    eprintln!("    --config <PATH>         Animation config JSON (default: built-in defaults)");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    sample_pose -c walk -f 60 ./assets/rigs/hero.rig.json");
}

#[derive(Debug)]
struct Args {
    rig_path: PathBuf,
    clip: String,
    frames: u32,
    fps: f32,
    speed: f32,
    config_path: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return Err("Missing rig path".to_string());
    }

    let mut clip = "0".to_string();
    let mut frames: u32 = 10;
    let mut fps: f32 = 30.0;
    let mut speed: f32 = 1.0;
    let mut config_path: Option<PathBuf> = None;
    let mut rig_path: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-c" | "--clip" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --clip".to_string());
                }
                clip = args[i].clone();
            }
            "-f" | "--frames" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --frames".to_string());
                }
                frames = args[i].parse().map_err(|_| format!("Invalid frame count: {}", args[i]))?;
            }
            "--fps" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --fps".to_string());
                }
                fps = args[i].parse().map_err(|_| format!("Invalid fps: {}", args[i]))?;
                if fps <= 0.0 {
                    return Err(format!("fps must be positive, got {}", fps));
                }
            }
            "--speed" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --speed".to_string());
                }
                speed = args[i].parse().map_err(|_| format!("Invalid speed: {}", args[i]))?;
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                config_path = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => {
                if rig_path.is_some() {
                    return Err("Multiple rig paths specified".to_string());
                }
                rig_path = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    let rig_path = rig_path.ok_or("Missing rig path")?;

    Ok(Args {
        rig_path,
        clip,
        frames,
        fps,
        speed,
        config_path,
    })
}

/// Resolve a clip argument as an index first, then as a clip name
fn resolve_clip(animator: &Animator, clip: &str) -> Option<usize> {
    if let Ok(index) = clip.parse::<usize>() {
        return (index < animator.clip_count()).then_some(index);
    }
    (0..animator.clip_count())
        .find(|&index| animator.clip(index).is_some_and(|c| c.name() == clip))
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    let config = match &args.config_path {
        Some(path) => match AnimationConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => AnimationConfig::default(),
    };

    let rig = match RigAsset::load_json(&args.rig_path) {
        Ok(rig) => rig,
        Err(e) => {
            eprintln!("Error loading rig: {}", e);
            std::process::exit(1);
        }
    };

    let (skeleton, clips) = match rig.build(&config) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("Invalid rig: {}", e);
            std::process::exit(1);
        }
    };

    let mut animator = Animator::with_clips(skeleton.clone(), clips);

    let Some(clip_index) = resolve_clip(&animator, &args.clip) else {
        eprintln!("Unknown clip: {} ({} clips in rig)", args.clip, animator.clip_count());
        std::process::exit(1);
    };

    if let Err(e) = animator.play_animation(clip_index) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Some(clip) = animator.current_clip() {
        println!("Pose Sampling Utility");
        println!("=====================");
        println!("Rig: {}", args.rig_path.display());
        println!(
            "Clip: {} ({:.3}s, {} ticks/s)",
            clip.name(),
            clip.duration_in_seconds(),
            clip.ticks_per_second()
        );
        println!("Bones: {}", skeleton.bone_count());
        println!("Frames: {} at {} fps, speed {}", args.frames, args.fps, args.speed);
        println!();
    }

    let delta_time = 1.0 / args.fps;
    let start = Instant::now();

    for frame in 0..args.frames {
        animator.update_animation(delta_time, args.speed);

        let ticks = animator.current_clip().map_or(0.0, |clip| clip.time_in_ticks());
        println!("Frame {} (tick {:.3})", frame, ticks);

        for (bone, matrix) in skeleton.bones().iter().zip(animator.final_bone_matrices()) {
            let t = matrix.w_axis.truncate();
            println!("  {:<24} ({:>9.4}, {:>9.4}, {:>9.4})", bone.name, t.x, t.y, t.z);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Summary:");
    println!("  Frames sampled: {}", args.frames);
    println!("  Total time: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
}
