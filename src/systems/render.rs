//! Render system.
//!
//! Clears the surface, draws the player's current frame scaled to the
//! surface, and, when [`DebugMode`] is present, overlays playback details.

use bevy_ecs::prelude::*;
use raylib::prelude::*;

use crate::events::moodchanged::LastMoodChange;
use crate::resources::debugmode::DebugMode;
use crate::resources::faceconfig::FaceConfig;
use crate::resources::faceplayer::AnimationPlayer;
use crate::resources::surfacesize::SurfaceSize;
use crate::resources::worldtime::WorldTime;

/// Draw one tick.
pub fn render_system(
    mut rl: NonSendMut<RaylibHandle>,
    th: NonSend<RaylibThread>,
    player: NonSend<AnimationPlayer<Texture2D>>,
    surface: Res<SurfaceSize>,
    config: Res<FaceConfig>,
    debug_mode: Option<Res<DebugMode>>,
    last_change: Res<LastMoodChange>,
    time: Res<WorldTime>,
) {
    let mut d = rl.begin_drawing(&th);
    d.clear_background(Color::BLACK);

    let target = player.render_target(*surface, config.scale);
    d.draw_texture_pro(
        target.frame,
        target.source,
        target.dest,
        Vector2 { x: 0.0, y: 0.0 },
        0.0,
        Color::WHITE,
    );

    if debug_mode.is_some() {
        render_debug_ui(&mut d, &player, &last_change, &time);
    }
}

fn render_debug_ui(
    d: &mut RaylibDrawHandle,
    player: &AnimationPlayer<Texture2D>,
    last_change: &LastMoodChange,
    time: &WorldTime,
) {
    let fps = d.get_fps();
    let text = format!(
        "DEBUG (F1 to toggle) | FPS: {} | Tick: {} ({:.1}ms)",
        fps,
        time.frame_count,
        time.delta * 1000.0
    );
    d.draw_text(&text, 10, 10, 20, Color::GREEN);

    let frame_count = player
        .library()
        .get(player.current_mood())
        .map(|sequence| sequence.len())
        .unwrap_or(0);
    let text = format!(
        "Mood: {}  Frame: {}/{}  Pending: {}",
        player.current_mood(),
        player.frame_index() + 1,
        frame_count,
        player.pending_requests()
    );
    d.draw_text(&text, 10, 35, 20, Color::GREEN);

    let text = format!(
        "Policy: {}  Default: {}  Delay: {}ms",
        player.policy(),
        player.default_mood(),
        player.frame_delay().as_millis()
    );
    d.draw_text(&text, 10, 60, 20, Color::GREEN);

    if let Some(change) = &last_change.0 {
        let text = format!("Last change: {} -> {} ({:?})", change.from, change.to, change.cause);
        d.draw_text(&text, 10, 85, 20, Color::GREEN);
    }
}
