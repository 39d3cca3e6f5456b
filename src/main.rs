//! rythmai CLI: live playback, WAV export and layout tools.
//!
//! Usage:
//!   rythmai play song.json
//!   rythmai export song.json -o rythmai-song.wav
//!   rythmai new -o song.json
//!   rythmai drum metal -o hat.wav
//!   rythmai inspect song.json

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ry_ir::{persist, DrumSynth, DrumSynthKind, DrumTrack, Layout};
use ry_master::{Controller, MeterLevels, MidiService, StepPosition, TransportListener, EXPORT_FILE_NAME};

#[derive(Parser)]
#[command(name = "rythmai", about = "Step sequencer and drum synth", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a layout through the default audio device
    Play {
        layout: PathBuf,
    },

    /// Render a layout to a WAV file
    Export {
        layout: PathBuf,

        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },

    /// Write the default layout
    New {
        #[arg(short, long, default_value = "layout.json")]
        output: PathBuf,
    },

    /// Render a default drum synth (membrane, noise or metal) to WAV
    Drum {
        kind: DrumSynthKind,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a summary of a layout
    Inspect {
        layout: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { layout } => play(&load(&layout)?),
        Commands::Export { layout, output } => export(&load(&layout)?, &output),
        Commands::New { output } => {
            persist::save(&output, &Layout::default())
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
            Ok(())
        }
        Commands::Drum { kind, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{kind}.wav")));
            let wav = ry_master::render_drum_sample(&DrumSynth::default_for(kind));
            std::fs::write(&output, &wav).with_context(|| format!("failed to write {}", output.display()))?;
            println!("Wrote {} ({} bytes)", output.display(), wav.len());
            Ok(())
        }
        Commands::Inspect { layout } => {
            print_summary(&load(&layout)?);
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<Layout> {
    persist::load(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Prints the playhead and master level on one line.
struct StatusLine {
    position: Option<StepPosition>,
    master_db: f32,
    stopped: bool,
}

impl TransportListener for StatusLine {
    fn on_step_change(&mut self, position: Option<StepPosition>) {
        self.position = position;
        self.stopped = position.is_none();
        self.draw();
    }

    fn on_meter_update(&mut self, levels: &MeterLevels) {
        self.master_db = levels.master;
    }
}

impl StatusLine {
    fn draw(&self) {
        match self.position {
            Some(p) => print!("\rBar: {:03} | Step: {:02} | Master: {:>6.1} dB", p.bar + 1, p.step + 1, self.master_db),
            None => print!("\r{:<44}", "Stopped"),
        }
        let _ = std::io::stdout().flush();
    }
}

fn play(layout: &Layout) -> Result<()> {
    print_summary(layout);
    println!();

    let mut ctrl = Controller::new(MidiService::new());
    for load in ctrl.update_all(layout.clone()) {
        // Failures are logged by the loader; the drum stays on its old sample.
        let _ = load.join();
    }
    ctrl.start().context("failed to start audio output")?;
    println!("Playing...");

    let mut status = StatusLine { position: None, master_db: f32::NEG_INFINITY, stopped: false };
    while !status.stopped {
        ctrl.poll(&mut status);
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("\rDone.{:<40}", "");
    Ok(())
}

fn export(layout: &Layout, path: &Path) -> Result<()> {
    println!("Rendering {} bars to {}...", layout.arrangement.len(), path.display());
    let wav = ry_master::export_wav(layout).context("render failed")?;
    std::fs::write(path, &wav).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Rendered {:.1} s ({} bytes)", layout.total_seconds(), wav.len());
    Ok(())
}

fn print_summary(layout: &Layout) {
    println!("Tempo:    {} BPM", layout.bpm);
    println!("Bars:     {} ({:.1} s)", layout.arrangement.len(), layout.total_seconds());
    println!("Patterns: {}", layout.patterns.len());
    let arrangement: Vec<String> = layout
        .arrangement
        .iter()
        .map(|entry| entry.map_or_else(|| "-".to_string(), |i| i.to_string()))
        .collect();
    println!("Order:    {}", arrangement.join(" "));
    for drum in DrumTrack::ALL {
        println!("{:<9} {}", format!("{drum}:"), layout.sample_source(drum).label());
    }
    println!("Master:   {:+.1} dB", layout.master_settings.volume_db);

    for (i, pattern) in layout.patterns.iter().enumerate() {
        let seq = &pattern.sequencer_state;
        let hits = |steps: &[bool]| steps.iter().filter(|s| **s).count();
        let notes = seq.bass.steps.iter().flatten().count();
        let chords = seq.chords.steps.iter().flatten().count();
        let muted: Vec<String> = pattern
            .track_settings
            .effective_mutes()
            .iter()
            .filter(|(_, muted)| **muted)
            .map(|(track, _)| track.to_string())
            .collect();
        println!(
            "  #{i}: kick {} snare {} hihat {} | bass {notes} | chords {chords}{}",
            hits(&seq.kick.steps),
            hits(&seq.snare.steps),
            hits(&seq.hihat.steps),
            if muted.is_empty() { String::new() } else { format!(" | muted: {}", muted.join(", ")) },
        );
    }
}
