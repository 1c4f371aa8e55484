use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, black_box};

use origin_anim::animation::{
    AnimationBlender,
    AnimationNode,
    Animator,
    QuatKey,
    SkeletalAnimation,
    Skeleton,
    SkeletonNode,
    Vec3Key,
};

use glam::{Mat4, Quat, Vec2, Vec3};

const CHAIN_LENGTH: usize = 64;
const KEYS_PER_TRACK: usize = 30;

/// A single chain of bones, each offset one unit along +Y from its parent
fn create_chain_skeleton() -> Arc<Skeleton> {
    let names: Vec<String> = (0..CHAIN_LENGTH).map(|i| format!("bone_{}", i)).collect();

    let step = Mat4::from_translation(Vec3::Y);
    let mut node = SkeletonNode::new(names[CHAIN_LENGTH - 1].clone(), step);
    for name in names.iter().rev().skip(1) {
        node = SkeletonNode::new(name.clone(), step).with_child(node);
    }

    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    Arc::new(Skeleton::from_rest_pose(node, &refs, CHAIN_LENGTH).expect("valid chain"))
}

fn create_wave_clip(name: &str, phase: f32) -> SkeletalAnimation {
    let duration = KEYS_PER_TRACK as f32;
    let mut clip = SkeletalAnimation::new(name, duration, 30.0);

    for bone in 0..CHAIN_LENGTH {
        let mut translation = Vec3Key::new();
        let mut rotation = QuatKey::new();
        let mut scale = Vec3Key::new();

        for key in 0..KEYS_PER_TRACK {
            let t = key as f32;
            translation.add_frame(Vec3::Y, t);
            let angle = (t * 0.2 + phase + bone as f32 * 0.1).sin() * 0.3;
            rotation.add_frame(Quat::from_rotation_z(angle), t);
            scale.add_frame(Vec3::ONE, t);
        }

        let node = AnimationNode::new(translation, rotation, scale);
        clip.add_channel(format!("bone_{}", bone), node, false).expect("valid channel");
    }

    clip
}

fn bench_animator_update(c: &mut Criterion) {
    let clips = vec![create_wave_clip("wave", 0.0)];
    let mut animator = Animator::with_clips(create_chain_skeleton(), clips);
    animator.play_animation(0).expect("clip 0 exists");

    c.bench_function("animator_update_64_bones", |b| {
        b.iter(|| {
            animator.update_animation(black_box(1.0 / 60.0), 1.0);
            black_box(animator.final_bone_matrices());
        });
    });
}

fn bench_animator_crossfade(c: &mut Criterion) {
    let clips = vec![create_wave_clip("wave", 0.0), create_wave_clip("wave_shifted", 1.5)];
    let mut animator = Animator::with_clips(create_chain_skeleton(), clips);
    animator.play_animation(0).expect("clip 0 exists");

    c.bench_function("animator_crossfade_64_bones", |b| {
        b.iter(|| {
            animator.update_crossfade(black_box(1.0 / 60.0), 1.0, 1, 0.5);
            black_box(animator.final_bone_matrices());
        });
    });
}

fn bench_blend_four_states(c: &mut Criterion) {
    let clips = (0..4).map(|i| create_wave_clip(&format!("wave_{}", i), i as f32)).collect();
    let mut blender = AnimationBlender::new(create_chain_skeleton(), clips);

    blender.add_animation(0, Vec2::new(-1.0, -1.0), Vec2::new(0.0, 0.0)).expect("clip 0");
    blender.add_animation(1, Vec2::new(0.0, -1.0), Vec2::new(1.0, 0.0)).expect("clip 1");
    blender.add_animation(2, Vec2::new(-1.0, 0.0), Vec2::new(0.0, 1.0)).expect("clip 2");
    blender.add_animation(3, Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)).expect("clip 3");

    c.bench_function("blend_four_states_64_bones", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let phase = frame as f32 * 0.05;
            let position = Vec2::new(phase.sin(), phase.cos()) * 0.5;
            blender.blend_animations(black_box(position), 1.0 / 60.0, 1.0);
            black_box(blender.final_bone_matrices());
        });
    });
}

fn bench_track_sample(c: &mut Criterion) {
    let mut track = QuatKey::new();
    for key in 0..256 {
        track.add_frame(Quat::from_rotation_y(key as f32 * 0.01), key as f32);
    }

    c.bench_function("quat_track_sample_256_keys", |b| {
        let mut time = 0.0f32;
        b.iter(|| {
            time = (time + 0.37) % 255.0;
            black_box(track.sample(black_box(time)))
        });
    });
}

criterion_group!(
    benches,
    bench_animator_update,
    bench_animator_crossfade,
    bench_blend_four_states,
    bench_track_sample,
);
criterion_main!(benches);
