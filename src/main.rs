//! Robot face main entry point.
//!
//! Plays pre-rendered expression sequences full screen and switches between
//! them when mood commands arrive from outside the process. Built on:
//! - **raylib** for the window, textures and drawing
//! - **bevy_ecs** for resources, systems and observers
//!
//! # Main Loop
//!
//! 1. Load `face.ini`, apply command line overrides
//! 2. Open the window, decode every mood into textures
//! 3. Start the command subscriber thread feeding the mood queue
//! 4. Each tick: read input, advance the face player, draw the frame
//! 5. On Escape, window close or SIGINT/SIGTERM: stop the subscriber, free
//!    textures, close the window
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --path ./expressions --default-mood BLANK
//! echo -n "HAPPY" | nc -u -w0 127.0.0.1 7400
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info, warn};
use raylib::ffi;
use raylib::prelude::Texture2D;

use robot_face::error::ConfigurationError;
use robot_face::events::moodchanged::{LastMoodChange, mood_changed_observer};
use robot_face::events::quit::quit_requested_observer;
use robot_face::events::switchdebug::switch_debug_observer;
use robot_face::resources::faceconfig::{CommandSourceKind, DedupMode, FaceConfig};
use robot_face::resources::faceplayer::{AnimationPlayer, BoundaryPolicy};
use robot_face::resources::input::InputState;
use robot_face::resources::moodlibrary::MoodLibrary;
use robot_face::resources::moodqueue::MoodQueue;
use robot_face::resources::moodsubscriber::{setup_mood_subscriber, shutdown_mood_subscriber};
use robot_face::resources::shutdown::ShutdownFlag;
use robot_face::resources::surfacesize::{ScaleMode, SurfaceSize};
use robot_face::resources::textureloader::TextureLoader;
use robot_face::resources::worldtime::WorldTime;
use robot_face::systems::faceanimation::animate_face;
use robot_face::systems::input::{dispatch_input_events, update_input_state};
use robot_face::systems::render::render_system;
use robot_face::systems::time::update_world_time;

/// Robot face mood player.
#[derive(Parser)]
#[command(version, about = "Robot face mood player.")]
struct Cli {
    /// INI configuration file. Missing file means defaults.
    #[arg(short, long, value_name = "PATH", default_value = "./face.ini")]
    config: PathBuf,

    /// Directory containing mood subfolders.
    #[arg(short, long, value_name = "DIR")]
    path: Option<PathBuf>,

    /// Name of the default mood.
    #[arg(short, long)]
    default_mood: Option<String>,

    /// Delay between frames in milliseconds.
    #[arg(short, long, value_name = "MS")]
    frame_delay: Option<u64>,

    /// When queued moods take effect.
    #[arg(long, value_enum)]
    policy: Option<BoundaryPolicy>,

    /// How frames are scaled to the screen.
    #[arg(long, value_enum)]
    scale: Option<ScaleMode>,

    /// Run in a window instead of full screen.
    #[arg(long)]
    windowed: bool,

    /// Where mood commands come from.
    #[arg(long, value_enum)]
    source: Option<CommandSourceKind>,

    /// UDP address to listen on for mood commands.
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Channel name accepted in "<channel> <mood>" datagrams.
    #[arg(long)]
    channel: Option<String>,

    /// Repeat filtering of incoming commands. Defaults to `last` with
    /// loop-restart and `off` with chain-with-fallback.
    #[arg(long, value_enum)]
    dedup: Option<DedupMode>,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut FaceConfig) {
        if let Some(path) = &self.path {
            config.mood_dir = path.clone();
        }
        if let Some(mood) = &self.default_mood {
            config.default_mood = mood.clone();
        }
        if let Some(delay) = self.frame_delay {
            config.frame_delay_ms = delay;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if self.windowed {
            config.fullscreen = false;
        }
        if let Some(source) = self.source {
            config.command_source = source;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(channel) = &self.channel {
            config.channel = channel.clone();
        }
        if let Some(dedup) = self.dedup {
            config.dedup = Some(dedup);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ConfigurationError> {
    let mut config = FaceConfig::with_path(&cli.config);
    config.load_from_file()?;
    cli.apply(&mut config);
    config.log_summary();

    if cli.save_config {
        return config.save_to_file();
    }

    // Fail before a window flashes up.
    if !config.mood_dir.is_dir() {
        return Err(ConfigurationError::MoodDirMissing(config.mood_dir.clone()));
    }

    let shutdown = ShutdownFlag::new();
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.raise()) {
            warn!("Failed to install signal handler: {}", e);
        }
    }

    // --------------- ECS world ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(InputState::default());
    world.insert_resource(LastMoodChange::default());
    world.insert_resource(shutdown);
    world.insert_resource(config.clone());

    // --------------- Raylib window & frames ---------------
    let (mut rl, thread) = raylib::init()
        .size(config.window_width as i32, config.window_height as i32)
        .resizable()
        .title("Robot Face")
        .build();
    // Escape is handled as an input event
    rl.set_exit_key(None);
    rl.set_target_fps(config.target_fps);

    if config.fullscreen {
        let monitor: i32 = unsafe { ffi::GetCurrentMonitor() };
        let monitor_width = unsafe { ffi::GetMonitorWidth(monitor) };
        let monitor_height = unsafe { ffi::GetMonitorHeight(monitor) };
        info!("Monitor dimensions: {}x{}", monitor_width, monitor_height);
        rl.set_window_size(monitor_width, monitor_height);
        rl.toggle_fullscreen();
        rl.hide_cursor();
    }

    let library = MoodLibrary::load(&config.mood_dir, &mut TextureLoader::new(&mut rl, &thread))?;

    let queue = MoodQueue::new();
    let player = AnimationPlayer::new(
        Arc::new(library),
        queue.clone(),
        &config.default_mood,
        Duration::ZERO,
    )
    .with_frame_delay(config.frame_delay())
    .with_policy(config.policy);
    info!(
        "Playing {} ({} policy, {}ms per frame)",
        player.current_mood(),
        player.policy(),
        config.frame_delay_ms
    );

    setup_mood_subscriber(&mut world, queue, player.default_mood().as_str())?;

    world.insert_resource(SurfaceSize {
        w: rl.get_screen_width(),
        h: rl.get_screen_height(),
    });
    world.insert_non_send_resource(player);
    world.insert_non_send_resource(rl);
    world.insert_non_send_resource(thread);

    world.spawn(Observer::new(mood_changed_observer));
    world.spawn(Observer::new(switch_debug_observer));
    world.spawn(Observer::new(quit_requested_observer));
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(
        (
            update_input_state,
            dispatch_input_events,
            animate_face::<Texture2D>,
            render_system,
        )
            .chain(),
    );

    // --------------- Main loop ---------------
    while !world
        .non_send_resource::<raylib::RaylibHandle>()
        .window_should_close()
        && !world.resource::<ShutdownFlag>().is_raised()
    {
        let dt = world
            .non_send_resource::<raylib::RaylibHandle>()
            .get_frame_time();
        update_world_time(&mut world, dt);

        update.run(&mut world);

        world.clear_trackers();

        // Update surface size each tick (may change due to resize)
        let (new_w, new_h) = {
            let rl = world.non_send_resource::<raylib::RaylibHandle>();
            (rl.get_screen_width(), rl.get_screen_height())
        };
        {
            let mut surface = world.resource_mut::<SurfaceSize>();
            surface.w = new_w;
            surface.h = new_h;
        }
    }

    shutdown_mood_subscriber(&mut world);
    // Textures must be unloaded while the window is still open.
    world.remove_non_send_resource::<AnimationPlayer<Texture2D>>();
    info!("Robot face stopped");
    Ok(())
}
