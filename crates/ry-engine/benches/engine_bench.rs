//! Engine render loop benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ry_engine::{render_drum, Frame, Player, ResyncPolicy, PROJECT_SAMPLE_RATE};
use ry_ir::{DrumSynth, DrumTrack, Layout, SampleBuffer};

fn playing_player() -> Player {
    let mut player = Player::new(Layout::default(), PROJECT_SAMPLE_RATE, ResyncPolicy::OnPatternChange);
    for drum in DrumTrack::ALL {
        let samples = render_drum(&DrumSynth::builtin(drum), PROJECT_SAMPLE_RATE);
        player.engine_mut().replace_sample(drum, SampleBuffer::new(samples, PROJECT_SAMPLE_RATE));
    }
    player.start();
    player
}

fn bench_render_block(c: &mut Criterion) {
    let mut player = playing_player();
    let mut block = vec![Frame::silence(); 512];

    c.bench_function("player_render_512", |b| {
        b.iter(|| {
            player.render_block(black_box(&mut block));
            if !player.is_playing() {
                player.start();
            }
            player.drain_ui_events().count()
        })
    });
}

fn bench_drum_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("drum_synth");
    for drum in DrumTrack::ALL {
        let synth = DrumSynth::builtin(drum);
        group.bench_function(drum.to_string(), |b| {
            b.iter(|| render_drum(black_box(&synth), PROJECT_SAMPLE_RATE))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render_block, bench_drum_synth);
criterion_main!(benches);
